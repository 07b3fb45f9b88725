use lopdf::Document;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Extract text from a PDF, one entry per page in page order, joined by newlines.
///
/// A page whose content stream cannot be decoded contributes an empty string
/// rather than failing the whole document.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes).map_err(|e| IngestError::Pdf(e.to_string()))?;

    let pages: Vec<String> = doc
        .get_pages()
        .keys()
        .map(|&page_number| {
            doc.extract_text(&[page_number]).unwrap_or_else(|e| {
                warn!(page = page_number, error = %e, "Could not extract page text");
                String::new()
            })
        })
        .collect();

    debug!(pages = pages.len(), "Extracted PDF text");
    Ok(pages.join("\n"))
}
