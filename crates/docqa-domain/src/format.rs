//! Supported upload formats

use std::fmt;

/// File formats the extractor understands
///
/// Dispatch is by lower-cased file extension; anything outside this set is
/// rejected before extraction is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Plain UTF-8 text (`.txt`)
    PlainText,

    /// Portable Document Format (`.pdf`)
    Pdf,

    /// Word-processor document (`.docx`)
    Docx,
}

impl DocumentFormat {
    /// All supported formats
    pub const ALL: [DocumentFormat; 3] = [
        DocumentFormat::PlainText,
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
    ];

    /// Canonical extension for the format
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "txt",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    /// Parse a format from an extension, case-insensitively
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" => Some(DocumentFormat::PlainText),
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    /// Extension of a filename: the text after the last `.`, if any
    pub fn extension_of(filename: &str) -> Option<&str> {
        filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// Detect the format of a filename
    ///
    /// # Examples
    ///
    /// ```
    /// use docqa_domain::DocumentFormat;
    ///
    /// assert_eq!(DocumentFormat::from_filename("Report.PDF"), Some(DocumentFormat::Pdf));
    /// assert_eq!(DocumentFormat::from_filename("notes.md"), None);
    /// assert_eq!(DocumentFormat::from_filename("README"), None);
    /// ```
    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::extension_of(filename).and_then(Self::from_extension)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
