//! Text extraction from uploaded files
//!
//! Dispatches on the lower-cased file extension. Format-specific failures are
//! logged and produce an empty string; only an unsupported extension is an
//! error here. Callers treat a blank result as a failed ingestion.

use crate::error::PipelineError;
use docqa_domain::DocumentFormat;
use tracing::{debug, warn};

/// Converts raw files into plain text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self
    }

    /// Resolve the format for a filename, rejecting anything unsupported
    pub fn format_for(filename: &str) -> Result<DocumentFormat, PipelineError> {
        DocumentFormat::from_filename(filename).ok_or_else(|| {
            let ext = DocumentFormat::extension_of(filename).unwrap_or("");
            PipelineError::UnsupportedFormat(if ext.is_empty() {
                format!("'{}' has no file extension", filename)
            } else {
                format!(".{}", ext.to_lowercase())
            })
        })
    }

    /// Extract text from in-memory bytes
    pub fn extract_bytes(&self, filename: &str, bytes: &[u8]) -> Result<String, PipelineError> {
        let format = Self::format_for(filename)?;
        Ok(self.extract(format, bytes))
    }

    /// Extract text for an already resolved format
    pub fn extract(&self, format: DocumentFormat, bytes: &[u8]) -> String {
        let result = match format {
            DocumentFormat::PlainText => extract_plain_text(bytes),
            DocumentFormat::Pdf => extract_pdf(bytes),
            DocumentFormat::Docx => extract_docx(bytes),
        };

        match result {
            Ok(text) => {
                debug!(
                    "Extracted {} chars from {} bytes of {}",
                    text.chars().count(),
                    bytes.len(),
                    format
                );
                text
            }
            Err(reason) => {
                warn!("Error extracting text from {} file: {}", format, reason);
                String::new()
            }
        }
    }
}

fn extract_plain_text(bytes: &[u8]) -> Result<String, String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| format!("invalid UTF-8: {}", e))
}

/// Per-page text joined with newlines
fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| format!("failed to load PDF: {}", e))?;

    let mut text = String::new();
    for (page_number, _) in doc.get_pages() {
        let page_text = doc
            .extract_text(&[page_number])
            .map_err(|e| format!("page {}: {}", page_number, e))?;
        text.push_str(&page_text);
        text.push('\n');
    }
    Ok(text)
}

/// Paragraph text joined with newlines; tables and other blocks are skipped
fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| format!("failed to read DOCX: {}", e))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(t) = child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}
