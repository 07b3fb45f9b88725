use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::error::{IngestError, Result};

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";

/// Containers whose text belongs to embedded objects, not the host paragraph.
const SKIPPED_CONTAINERS: [&[u8]; 4] = [
    b"w:txbxContent",
    b"w:drawing",
    b"w:pict",
    b"mc:AlternateContent",
];

fn inside_skipped(stack: &[Vec<u8>]) -> bool {
    stack
        .iter()
        .any(|name| SKIPPED_CONTAINERS.contains(&name.as_slice()))
}

/// Extract body paragraphs from a DOCX package.
///
/// Only paragraphs that are direct children of `<w:body>` count, so table
/// cells are skipped. Text inside drawings, VML shapes and alternate-content
/// blocks (where text boxes live) is ignored. Blank paragraphs are dropped and
/// the rest joined by newlines.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IngestError::Docx(format!("Failed to open package: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| IngestError::Docx(format!("Missing {}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| IngestError::Docx(format!("Failed to read {}: {}", DOCUMENT_PART, e)))?;

    let paragraphs = body_paragraphs(&xml)?;
    debug!(paragraphs = paragraphs.len(), "Extracted DOCX text");

    Ok(paragraphs.join("\n"))
}

fn body_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    // Stack depth of the body paragraph currently being read
    let mut paragraph_depth: Option<usize> = None;
    let mut current = String::new();
    let mut paragraphs = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                if name == b"w:p"
                    && paragraph_depth.is_none()
                    && stack.last().is_some_and(|parent| parent == b"w:body")
                {
                    paragraph_depth = Some(stack.len());
                    current.clear();
                }
                stack.push(name);
            }

            Ok(Event::Empty(e)) => {
                // Tab stops in w:pPr/w:tabs share the w:tab name; only run content counts
                if paragraph_depth.is_some()
                    && stack.last().is_some_and(|n| n == b"w:r")
                    && !inside_skipped(&stack)
                {
                    match e.name().as_ref() {
                        b"w:tab" => current.push('\t'),
                        b"w:br" | b"w:cr" => current.push('\n'),
                        _ => {}
                    }
                }
            }

            Ok(Event::Text(e)) => {
                if paragraph_depth.is_some()
                    && stack.last().is_some_and(|n| n == b"w:t")
                    && !inside_skipped(&stack)
                {
                    let text = e
                        .unescape()
                        .map_err(|e| IngestError::Docx(e.to_string()))?;
                    current.push_str(&text);
                }
            }

            Ok(Event::End(_)) => {
                stack.pop();
                if paragraph_depth == Some(stack.len()) {
                    paragraph_depth = None;
                    if !current.trim().is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
            }

            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(IngestError::Docx(format!(
                    "Malformed XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}
