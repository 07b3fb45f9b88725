use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning an uploaded document into plain text.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Only `.pdf` and `.docx` are understood.
    #[error("Unsupported file format: '{extension}' (only .docx or .pdf supported)")]
    UnsupportedFormat { extension: String },

    #[error("Failed to read file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse PDF: {0}")]
    Pdf(String),

    #[error("Failed to parse DOCX: {0}")]
    Docx(String),

    /// The blocking parser task panicked or was cancelled.
    #[error("Text extraction task failed: {0}")]
    Join(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
