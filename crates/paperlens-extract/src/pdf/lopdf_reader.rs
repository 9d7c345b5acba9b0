use lopdf::Document;
use lopdf::encryption::DecryptionError;

use paperlens_core::config::{DEFAULT_FAST_PAGE_CAP, DEFAULT_PAGE_ACCEPTANCE_RATIO};
use paperlens_core::{
    BackendError, ExtractionConfig, PdfStrategy, StrategyOutput, join_pages, printable_ratio,
};

/// Load `bytes` with lopdf and try the empty user password on encrypted
/// documents.
pub(crate) fn load(bytes: &[u8]) -> lopdf::Result<Document> {
    let mut document = Document::load_mem(bytes)?;
    if document.is_encrypted() {
        document.decrypt("")?;
    }
    Ok(document)
}

/// Open `bytes` with lopdf, unlocking documents that only carry an owner
/// password.
///
/// Only a rejected empty password is reported as [`BackendError::Encrypted`].
/// Encryption lopdf cannot handle (AES, V4 and later) is an open error so
/// the next strategy gets a chance at the file.
pub(crate) fn open(bytes: &[u8]) -> Result<Document, BackendError> {
    load(bytes).map_err(classify)
}

fn classify(error: lopdf::Error) -> BackendError {
    match error {
        lopdf::Error::Decryption(DecryptionError::IncorrectPassword) => BackendError::Encrypted,
        other => BackendError::OpenError(other.to_string()),
    }
}

/// Lightweight page-by-page reader, the first link of the PDF chain.
///
/// Reads at most `max_pages` pages and keeps a page only when its printable
/// ratio is strictly above `page_acceptance_ratio`.
pub struct LopdfStrategy {
    max_pages: usize,
    page_acceptance_ratio: f64,
}

impl Default for LopdfStrategy {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_FAST_PAGE_CAP,
            page_acceptance_ratio: DEFAULT_PAGE_ACCEPTANCE_RATIO,
        }
    }
}

impl LopdfStrategy {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            max_pages: config.fast_page_cap(),
            page_acceptance_ratio: config.page_acceptance_ratio(),
        }
    }

    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    pub fn with_page_acceptance_ratio(mut self, ratio: f64) -> Self {
        self.page_acceptance_ratio = ratio;
        self
    }
}

impl PdfStrategy for LopdfStrategy {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, bytes: &[u8]) -> Result<StrategyOutput, BackendError> {
        let document = open(bytes)?;
        let pages = document.get_pages();
        let pages_total = pages.len();

        let mut accepted = Vec::new();
        let mut pages_processed = 0;
        for &number in pages.keys().take(self.max_pages) {
            pages_processed += 1;
            let text = match document.extract_text(&[number]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!(page = number, error = %e, "lopdf: page failed");
                    continue;
                }
            };
            if text.trim().is_empty() {
                continue;
            }
            let ratio = printable_ratio(&text);
            if ratio > self.page_acceptance_ratio {
                accepted.push((number as usize, text));
            } else {
                tracing::debug!(page = number, ratio, "lopdf: page rejected as noise");
            }
        }

        Ok(StrategyOutput {
            text: join_pages(&accepted),
            pages_processed,
            pages_total,
        })
    }
}
