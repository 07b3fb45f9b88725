pub mod docx;
pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod pdf;
pub mod reader;

pub use error::IngestError;
pub use reader::{DocumentFormat, FileReader};

use std::path::Path;

/// Load the plain text of a `.pdf` or `.docx` file.
pub async fn load_text(file_path: &Path) -> Result<String, IngestError> {
    FileReader::read_file(file_path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_pdf_and_docx_from_disk() {
        let dir = tempfile::tempdir().unwrap();

        let pdf_path = dir.path().join("report.pdf");
        std::fs::write(&pdf_path, fixtures::build_pdf(&["Hello world"])).unwrap();
        assert!(load_text(&pdf_path).await.unwrap().contains("Hello world"));

        let docx_path = dir.path().join("memo.docx");
        let body = "<w:p><w:r><w:t>Quarterly memo</w:t></w:r></w:p>";
        std::fs::write(&docx_path, fixtures::build_docx(body)).unwrap();
        assert_eq!(load_text(&docx_path).await.unwrap(), "Quarterly memo");
    }

    #[tokio::test]
    async fn test_read_bytes_uses_file_name() {
        let bytes = fixtures::build_docx("<w:p><w:r><w:t>Upload</w:t></w:r></w:p>");
        assert_eq!(FileReader::read_bytes("upload.DOCX", bytes).await.unwrap(), "Upload");

        let err = FileReader::read_bytes("upload.odt", Vec::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
    }
}
