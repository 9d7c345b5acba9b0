use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The PDF is encrypted and the empty password did not open it.
    #[error("document is encrypted")]
    Encrypted,
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
}

/// Text produced by one PDF strategy, with its page accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyOutput {
    pub text: String,
    pub pages_processed: usize,
    pub pages_total: usize,
}

impl StrategyOutput {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Trait for the independent PDF readers tried by the fallback chain.
///
/// Implementors own their own page cap and per-page acceptance rules; the
/// chain itself (ordering, short-circuiting, scan advisory) lives in
/// `paperlens_extract::pdf`. All parsing happens on the in-memory buffer.
pub trait PdfStrategy: Send + Sync {
    /// Short name reported in results and logs.
    fn name(&self) -> &'static str;

    /// Extract text from the PDF held in `bytes`.
    ///
    /// An `Ok` with blank text means "nothing usable", which lets the chain
    /// move on. [`BackendError::Encrypted`] aborts the whole chain.
    fn extract(&self, bytes: &[u8]) -> Result<StrategyOutput, BackendError>;
}

/// Join accepted pages under `--- Page N ---` headers (1-based numbers).
pub fn join_pages(pages: &[(usize, String)]) -> String {
    let mut out = String::new();
    for (number, text) in pages {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("--- Page {} ---\n", number));
        out.push_str(text.trim_end());
        out.push('\n');
    }
    out
}
