use std::panic::{self, AssertUnwindSafe};

use paperlens_core::config::DEFAULT_STREAM_PAGE_CAP;
use paperlens_core::{BackendError, ExtractionConfig, PdfStrategy, StrategyOutput, join_pages};

/// Whole-document content-stream reader, the last link of the PDF chain.
///
/// pdf-extract decodes every page in a single pass; only the first
/// `max_pages` pages of its output are kept. No per-page noise filter runs
/// here, the document-level quality gate covers this path.
pub struct PdfExtractStrategy {
    max_pages: usize,
}

impl Default for PdfExtractStrategy {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_STREAM_PAGE_CAP,
        }
    }
}

impl PdfExtractStrategy {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            max_pages: config.stream_page_cap(),
        }
    }
}

impl PdfStrategy for PdfExtractStrategy {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, bytes: &[u8]) -> Result<StrategyOutput, BackendError> {
        // pdf-extract panics on some malformed input instead of erroring
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }))
        .map_err(|_| BackendError::ExtractionError("pdf-extract panicked".into()))?
        .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let pages_total = pages.len();
        let kept: Vec<(usize, String)> = pages
            .into_iter()
            .take(self.max_pages)
            .enumerate()
            .map(|(i, text)| (i + 1, text))
            .collect();
        let pages_processed = kept.len();
        let non_blank: Vec<(usize, String)> = kept
            .into_iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .collect();

        Ok(StrategyOutput {
            text: join_pages(&non_blank),
            pages_processed,
            pages_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_an_error_not_a_panic() {
        let result = PdfExtractStrategy::default().extract(b"%PDF-1.4 garbage");
        assert!(result.is_err() || result.unwrap().is_empty());
    }
}
