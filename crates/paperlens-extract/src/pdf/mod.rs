//! The PDF fallback chain.
//!
//! Strategies run in order on the same in-memory buffer. The first one to
//! return non-blank text wins; an encrypted document stops the chain at
//! once. The first-page scan check runs independently and its verdict is
//! attached to every PDF result.

use std::panic::{self, AssertUnwindSafe};

use paperlens_core::{
    BackendError, DocumentFormat, ExtractError, ExtractionAttempt, ExtractionConfig,
    ExtractionResult, PdfStrategy,
};

pub mod lopdf_reader;
pub mod scan;
pub mod stream_reader;

pub use lopdf_reader::LopdfStrategy;
pub use stream_reader::PdfExtractStrategy;

/// Ordered list of [`PdfStrategy`] implementations plus the scan threshold.
pub struct PdfChain {
    strategies: Vec<Box<dyn PdfStrategy>>,
    scanned_ratio: f64,
}

impl PdfChain {
    /// The standard chain: lopdf, then MuPDF (when compiled in), then
    /// pdf-extract.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let mut strategies: Vec<Box<dyn PdfStrategy>> =
            vec![Box::new(LopdfStrategy::from_config(config))];
        #[cfg(feature = "mupdf")]
        strategies.push(Box::new(paperlens_pdf_mupdf::MupdfStrategy::from_config(
            config,
        )));
        strategies.push(Box::new(PdfExtractStrategy::from_config(config)));
        Self::with_strategies(strategies, config.scanned_ratio())
    }

    pub fn with_strategies(strategies: Vec<Box<dyn PdfStrategy>>, scanned_ratio: f64) -> Self {
        Self {
            strategies,
            scanned_ratio,
        }
    }

    /// Names of the strategies, in the order they run.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the chain over `bytes`.
    pub fn extract(&self, bytes: &[u8]) -> ExtractionResult {
        let likely_scanned = scan::likely_scanned(bytes, self.scanned_ratio);
        if likely_scanned {
            tracing::info!("first page has no usable text layer; document may be scanned");
        }

        let mut attempts: Vec<ExtractionAttempt> = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            let attempt = run_strategy(strategy.as_ref(), bytes);
            match &attempt.result {
                Ok(output) if !output.is_empty() => {
                    tracing::debug!(
                        strategy = attempt.strategy,
                        pages_processed = output.pages_processed,
                        pages_total = output.pages_total,
                        "pdf strategy produced text"
                    );
                    return ExtractionResult::from_text(DocumentFormat::Pdf, output.text.clone())
                        .with_pages(output.pages_processed, output.pages_total)
                        .with_strategy(attempt.strategy)
                        .with_likely_scanned(likely_scanned);
                }
                Ok(_) => {
                    tracing::debug!(strategy = attempt.strategy, "pdf strategy found no text");
                }
                Err(BackendError::Encrypted) => {
                    tracing::info!(strategy = attempt.strategy, "pdf is encrypted; aborting chain");
                    return ExtractionResult::failure(
                        DocumentFormat::Pdf,
                        ExtractError::EncryptedDocument,
                    )
                    .with_likely_scanned(likely_scanned);
                }
                Err(e) => {
                    tracing::debug!(strategy = attempt.strategy, error = %e, "pdf strategy failed");
                }
            }
            attempts.push(attempt);
        }

        exhausted(&attempts).with_likely_scanned(likely_scanned)
    }
}

fn run_strategy(strategy: &dyn PdfStrategy, bytes: &[u8]) -> ExtractionAttempt {
    let result = panic::catch_unwind(AssertUnwindSafe(|| strategy.extract(bytes)))
        .unwrap_or_else(|_| {
            Err(BackendError::ExtractionError(format!(
                "{} panicked",
                strategy.name()
            )))
        });
    ExtractionAttempt {
        strategy: strategy.name(),
        result,
    }
}

/// Result for a chain where no strategy produced text.
///
/// If at least one strategy could read the document, it is simply empty;
/// if every one of them errored, the file is structurally broken.
fn exhausted(attempts: &[ExtractionAttempt]) -> ExtractionResult {
    let (mut processed, mut total) = (0, 0);
    let mut errors = Vec::new();
    for attempt in attempts {
        match &attempt.result {
            Ok(output) => {
                processed = processed.max(output.pages_processed);
                total = total.max(output.pages_total);
            }
            Err(e) => errors.push(format!("{}: {e}", attempt.strategy)),
        }
    }

    let error = if !attempts.is_empty() && errors.len() == attempts.len() {
        ExtractError::StructuralParseFailure(errors.join("; "))
    } else {
        ExtractError::EmptyExtraction
    };
    tracing::warn!(error = %error, "no pdf strategy produced text");
    ExtractionResult::failure(DocumentFormat::Pdf, error).with_pages(processed, total)
}
