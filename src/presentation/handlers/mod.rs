mod api_error;
mod documents;
mod dto;
mod health;
mod messages;
mod pages;
mod sessions;

pub use api_error::{ApiError, ErrorResponse, parse_session_id};
pub use documents::{read_upload, remove_document_handler, upload_document_handler};
pub use dto::{DocumentView, ProviderErrorView, SessionResponse, SubmitRequest, SubmitResponse, TurnView};
pub use health::health_handler;
pub use messages::submit_message_handler;
pub use pages::{
    chat_page_handler, index_handler, page_remove_document_handler, page_reset_handler,
    page_submit_handler, page_upload_handler,
};
pub use sessions::{
    create_session_handler, delete_session_handler, get_session_handler, reset_session_handler,
};
