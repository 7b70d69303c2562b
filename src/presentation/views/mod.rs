mod chat_page;

pub use chat_page::{ChatPage, render_chat_page};
