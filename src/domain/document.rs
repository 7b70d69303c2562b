use chrono::{DateTime, Utc};

/// Text stored in place of extracted content when the file kind is not recognised.
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type.";

/// An uploaded file as seen before extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub filename: String,
    pub kind: Option<FileKind>,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Text,
    Docx,
    Xlsx,
    Pdf,
}

impl FileKind {
    /// Resolves the kind from the suffix after the last `.`, ignoring case.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = filename.rsplit('.').next()?.to_lowercase();
        Self::from_extension(&extension)
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "txt" => Some(Self::Text),
            "docx" => Some(Self::Docx),
            "xlsx" => Some(Self::Xlsx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    pub fn all() -> [FileKind; 4] {
        [Self::Text, Self::Docx, Self::Xlsx, Self::Pdf]
    }
}

impl Document {
    pub fn new(filename: String, size_bytes: u64) -> Self {
        let kind = FileKind::from_filename(&filename);
        Self {
            filename,
            kind,
            size_bytes,
        }
    }

    pub fn extension(&self) -> String {
        self.filename
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// The document currently attached to a session, with its extracted text.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedDocument {
    pub document: Document,
    pub text: String,
    pub uploaded_at: DateTime<Utc>,
}

impl UploadedDocument {
    pub fn new(document: Document, text: String) -> Self {
        Self {
            document,
            text,
            uploaded_at: Utc::now(),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.document.kind.is_some()
    }
}
