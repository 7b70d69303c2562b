mod composite_file_loader;
mod docx_adapter;
mod ooxml;
mod pdf_adapter;
mod plain_text_adapter;
mod text_table;
mod xlsx_adapter;

pub use composite_file_loader::CompositeFileLoader;
pub use docx_adapter::DocxAdapter;
pub use pdf_adapter::PdfAdapter;
pub use plain_text_adapter::PlainTextAdapter;
pub use text_table::{MAX_PREVIEW_ROWS, render_table};
pub use xlsx_adapter::XlsxAdapter;
