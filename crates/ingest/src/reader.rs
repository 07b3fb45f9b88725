use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::{docx, pdf};

/// Formats the loader can pull text out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Classify a file name by its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(IngestError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }
}

pub struct FileReader;

impl FileReader {
    pub async fn read_file(path: &Path) -> Result<String> {
        // Reject before touching the file.
        let format = DocumentFormat::from_path(path)?;

        let bytes = fs::read(path).await.map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::extract(format, bytes).await
    }

    /// Extract text from an in-memory upload; `file_name` decides the format.
    pub async fn read_bytes(file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let format = DocumentFormat::from_path(file_name)?;
        Self::extract(format, bytes).await
    }

    async fn extract(format: DocumentFormat, bytes: Vec<u8>) -> Result<String> {
        debug!(?format, size = bytes.len(), "Extracting document text");

        // Both parsers are synchronous and CPU bound.
        tokio::task::spawn_blocking(move || match format {
            DocumentFormat::Pdf => pdf::extract_text(&bytes),
            DocumentFormat::Docx => docx::extract_text(&bytes),
        })
        .await
        .map_err(|e| IngestError::Join(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(DocumentFormat::from_path("report.pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_path("memo.docx").unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_path("SCAN.PDF").unwrap(), DocumentFormat::Pdf);
    }

    #[test]
    fn test_unsupported_extensions() {
        for name in ["notes.txt", "legacy.doc", "README", "archive.pdf.zip"] {
            match DocumentFormat::from_path(name) {
                Err(IngestError::UnsupportedFormat { .. }) => {}
                other => panic!("{name}: expected UnsupportedFormat, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_unsupported_file_is_never_read() {
        // The path does not exist: a Read error would mean we tried to open it.
        let err = FileReader::read_file(Path::new("/nonexistent/notes.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat { ref extension } if extension == "txt"));
        assert!(err.to_string().contains("only .docx or .pdf supported"));
    }

    #[tokio::test]
    async fn test_missing_supported_file() {
        let err = FileReader::read_file(Path::new("/nonexistent/report.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Read { .. }));
    }
}
