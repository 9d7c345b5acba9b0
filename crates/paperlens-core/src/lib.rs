use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backend;
pub mod config;
pub mod config_file;
pub mod quality;
pub mod sniff;

// Re-export for convenience
pub use backend::{BackendError, PdfStrategy, StrategyOutput, join_pages};
pub use config::{ConfigError, ExtractionConfig, ExtractionConfigBuilder};
pub use quality::{classify, finalize, printable_ratio};
pub use sniff::{PDF_MAGIC, sniff};

/// Diagnostic shown when every PDF strategy came back empty.
pub const EMPTY_EXTRACTION_DIAGNOSTIC: &str = "No text could be extracted from this PDF. \
Likely causes: the PDF is a scanned or image-only document, it uses an unusual font \
encoding, or the file is damaged or protected. What you can do: \
(1) run the file through OCR software and upload the result; \
(2) copy the text out of the PDF and paste it directly; \
(3) re-export or \"print to PDF\" from the original source so the PDF contains real text.";

/// The kind of document the pipeline is dealing with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
    Unknown,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Txt => "txt",
            DocumentFormat::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded document: its bytes plus the name it was declared with.
///
/// Borrowed for the duration of one extraction call; the pipeline never
/// keeps a reference after returning.
#[derive(Debug, Clone, Copy)]
pub struct RawDocument<'a> {
    pub bytes: &'a [u8],
    pub filename: &'a str,
}

impl<'a> RawDocument<'a> {
    pub fn new(bytes: &'a [u8], filename: &'a str) -> Self {
        Self { bytes, filename }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One run of a PDF strategy inside the fallback chain.
#[derive(Debug, Clone)]
pub struct ExtractionAttempt {
    pub strategy: &'static str,
    pub result: Result<StrategyOutput, BackendError>,
}

impl ExtractionAttempt {
    /// True when the strategy ran and produced non-blank text.
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(output) if !output.is_empty())
    }
}

/// Why a document did not yield usable text.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ExtractError {
    #[error("unsupported file format; please upload a PDF, DOCX or TXT file")]
    UnsupportedFormat,
    #[error("undecodable text encoding")]
    UndecodableText,
    #[error("document is encrypted")]
    EncryptedDocument,
    #[error("{}", EMPTY_EXTRACTION_DIAGNOSTIC)]
    EmptyExtraction,
    /// A structured document (DOCX) parsed fine but contained no text.
    #[error("no text found in document")]
    NoTextFound,
    #[error("failed to parse document: {0}")]
    StructuralParseFailure(String),
    #[error("empty content")]
    EmptyContent,
    #[error("content is unreadable (mostly non-printable characters)")]
    Unreadable,
}

/// Final output of the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    pub usable: bool,
    pub diagnostic: Option<String>,
    pub pages_processed: usize,
    pub pages_total: usize,
    /// Set when `pages_processed < pages_total`.
    pub truncated: bool,
    /// Advisory from the first-page scan check, reported even when a
    /// strategy eventually recovered text.
    pub likely_scanned: bool,
    pub format: DocumentFormat,
    /// Name of the PDF strategy whose output was used.
    pub strategy: Option<String>,
    pub error: Option<ExtractError>,
}

impl ExtractionResult {
    /// A result carrying extracted text, pending the quality gate.
    pub fn from_text(format: DocumentFormat, text: String) -> Self {
        Self {
            text,
            usable: false,
            diagnostic: None,
            pages_processed: 0,
            pages_total: 0,
            truncated: false,
            likely_scanned: false,
            format,
            strategy: None,
            error: None,
        }
    }

    /// A result for a document that failed before any text was produced.
    pub fn failure(format: DocumentFormat, error: ExtractError) -> Self {
        Self {
            diagnostic: Some(error.to_string()),
            error: Some(error),
            ..Self::from_text(format, String::new())
        }
    }

    /// Record page accounting. `pages_total` is raised to `pages_processed`
    /// when the document's page count was not known.
    pub fn with_pages(mut self, pages_processed: usize, pages_total: usize) -> Self {
        self.pages_processed = pages_processed;
        self.pages_total = pages_total.max(pages_processed);
        self.truncated = self.pages_processed < self.pages_total;
        self
    }

    pub fn with_strategy(mut self, strategy: &str) -> Self {
        self.strategy = Some(strategy.to_string());
        self
    }

    pub fn with_likely_scanned(mut self, likely_scanned: bool) -> Self {
        self.likely_scanned = likely_scanned;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_diagnostic() {
        let r = ExtractionResult::failure(DocumentFormat::Pdf, ExtractError::EncryptedDocument);
        assert!(!r.usable);
        assert!(r.text.is_empty());
        assert_eq!(r.diagnostic.as_deref(), Some("document is encrypted"));
    }

    #[test]
    fn with_pages_flags_truncation() {
        let r = ExtractionResult::from_text(DocumentFormat::Pdf, "x".into()).with_pages(10, 15);
        assert!(r.truncated);
        let r = ExtractionResult::from_text(DocumentFormat::Pdf, "x".into()).with_pages(3, 3);
        assert!(!r.truncated);
    }

    #[test]
    fn with_pages_never_reports_more_processed_than_total() {
        let r = ExtractionResult::from_text(DocumentFormat::Pdf, "x".into()).with_pages(4, 0);
        assert_eq!(r.pages_total, 4);
        assert!(!r.truncated);
    }

    #[test]
    fn empty_extraction_message_has_remediation() {
        let msg = ExtractError::EmptyExtraction.to_string();
        assert!(msg.contains("OCR"));
        assert!(msg.contains("paste"));
        assert!(msg.contains("re-export"));
    }

    #[test]
    fn error_serializes_with_kind_tag() {
        let json = serde_json::to_value(ExtractError::StructuralParseFailure("bad zip".into()))
            .unwrap();
        assert_eq!(json["kind"], "structural_parse_failure");
        assert_eq!(json["detail"], "bad zip");

        let json = serde_json::to_value(ExtractError::EmptyContent).unwrap();
        assert_eq!(json["kind"], "empty_content");
    }
}
