//! Turn an uploaded paper (PDF, DOCX or plain text) into text the
//! interpretation backend can use, or into a diagnostic that says why not.

use paperlens_core::{DocumentFormat, ExtractError, ExtractionResult, RawDocument, finalize, sniff};

pub mod docx;
pub mod pdf;
pub mod text;

pub use paperlens_core::{ExtractionConfig, ExtractionConfigBuilder};
pub use pdf::PdfChain;

/// The extraction pipeline: sniff, dispatch to a format engine, then apply
/// the quality gate.
///
/// Holds no per-document state, so one instance can serve every request.
pub struct Extractor {
    config: ExtractionConfig,
    pdf: PdfChain,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::with_config(ExtractionConfig::default())
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ExtractionConfig) -> Self {
        let pdf = PdfChain::from_config(&config);
        Self { config, pdf }
    }

    /// Replace the PDF chain, e.g. to run a single strategy.
    pub fn with_pdf_chain(mut self, pdf: PdfChain) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract text from one document.
    pub fn extract(&self, document: RawDocument<'_>) -> ExtractionResult {
        let format = sniff(document.filename, document.bytes);

        let raw = if document.is_empty() {
            ExtractionResult::failure(format, ExtractError::EmptyContent)
        } else {
            match format {
                DocumentFormat::Pdf => self.pdf.extract(document.bytes),
                DocumentFormat::Docx => docx::extract(document.bytes),
                DocumentFormat::Txt => text::extract(document.bytes, self.config.text_encodings()),
                DocumentFormat::Unknown => {
                    ExtractionResult::failure(format, ExtractError::UnsupportedFormat)
                }
            }
        };

        let result = finalize(raw, &self.config);
        tracing::info!(
            filename = document.filename,
            bytes = document.bytes.len(),
            format = %result.format,
            usable = result.usable,
            chars = result.text.chars().count(),
            pages_processed = result.pages_processed,
            pages_total = result.pages_total,
            likely_scanned = result.likely_scanned,
            "document extracted"
        );
        result
    }

    /// Run text the user pasted directly through the quality gate.
    pub fn check_pasted(&self, text: &str) -> ExtractionResult {
        finalize(
            ExtractionResult::from_text(DocumentFormat::Txt, text.to_string()),
            &self.config,
        )
    }
}

/// One-shot convenience wrapper around [`Extractor`].
pub fn extract_document(bytes: &[u8], filename: &str, config: &ExtractionConfig) -> ExtractionResult {
    Extractor::with_config(config.clone()).extract(RawDocument::new(bytes, filename))
}
