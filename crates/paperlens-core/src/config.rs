use encoding_rs::Encoding;
use thiserror::Error;

pub const DEFAULT_PAGE_ACCEPTANCE_RATIO: f64 = 0.7;
pub const DEFAULT_SCANNED_RATIO: f64 = 0.3;
pub const DEFAULT_FAST_PAGE_CAP: usize = 10;
pub const DEFAULT_LAYOUT_PAGE_CAP: usize = 20;
pub const DEFAULT_STREAM_PAGE_CAP: usize = 20;

/// Candidate encodings for plain text, tried in order (WHATWG labels).
///
/// windows-1252 maps all 256 byte values, so with this list no text file is
/// undecodable and `iso-8859-15` is never reached. It only takes effect in a
/// configured list that puts it ahead of windows-1252 (or omits it), e.g. to
/// read 0xA4 as the euro sign.
pub const DEFAULT_TEXT_ENCODINGS: &[&str] = &["utf-8", "gbk", "big5", "windows-1252", "iso-8859-15"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    InvalidRatio { name: &'static str, value: f64 },
    #[error("{0} must be at least 1")]
    ZeroPageCap(&'static str),
    #[error("unknown text encoding label: {0}")]
    UnknownEncoding(String),
    #[error("at least one text encoding must be configured")]
    NoEncodings,
}

/// Tunables for the extraction pipeline.
///
/// Use [`ExtractionConfigBuilder`] to override the defaults; values are
/// validated when the builder runs.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Minimum printable ratio for a PDF page to be kept (exclusive).
    pub(crate) page_acceptance_ratio: f64,
    /// First-page printable ratio below which a PDF looks scanned. Also the
    /// document-level floor of the quality gate.
    pub(crate) scanned_ratio: f64,
    /// Page cap of the lightweight reader.
    pub(crate) fast_page_cap: usize,
    /// Page cap of the layout-aware reader.
    pub(crate) layout_page_cap: usize,
    /// Page cap of the stream-level reader.
    pub(crate) stream_page_cap: usize,
    pub(crate) text_encodings: Vec<&'static Encoding>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            page_acceptance_ratio: DEFAULT_PAGE_ACCEPTANCE_RATIO,
            scanned_ratio: DEFAULT_SCANNED_RATIO,
            fast_page_cap: DEFAULT_FAST_PAGE_CAP,
            layout_page_cap: DEFAULT_LAYOUT_PAGE_CAP,
            stream_page_cap: DEFAULT_STREAM_PAGE_CAP,
            text_encodings: resolve_labels(DEFAULT_TEXT_ENCODINGS.iter().copied())
                .unwrap_or_default(),
        }
    }
}

impl ExtractionConfig {
    pub fn page_acceptance_ratio(&self) -> f64 {
        self.page_acceptance_ratio
    }

    pub fn scanned_ratio(&self) -> f64 {
        self.scanned_ratio
    }

    pub fn fast_page_cap(&self) -> usize {
        self.fast_page_cap
    }

    pub fn layout_page_cap(&self) -> usize {
        self.layout_page_cap
    }

    pub fn stream_page_cap(&self) -> usize {
        self.stream_page_cap
    }

    pub fn text_encodings(&self) -> &[&'static Encoding] {
        &self.text_encodings
    }
}

fn resolve_labels<'a>(
    labels: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<&'static Encoding>, ConfigError> {
    let mut encodings: Vec<&'static Encoding> = Vec::new();
    for label in labels {
        let enc = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| ConfigError::UnknownEncoding(label.to_string()))?;
        if !encodings.contains(&enc) {
            encodings.push(enc);
        }
    }
    if encodings.is_empty() {
        return Err(ConfigError::NoEncodings);
    }
    Ok(encodings)
}

/// Builder for [`ExtractionConfig`].
///
/// Fails fast in [`build()`](Self::build) on out-of-range ratios, zero page
/// caps and unknown encoding labels.
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfigBuilder {
    page_acceptance_ratio: Option<f64>,
    scanned_ratio: Option<f64>,
    fast_page_cap: Option<usize>,
    layout_page_cap: Option<usize>,
    stream_page_cap: Option<usize>,
    text_encodings: Option<Vec<String>>,
}

impl ExtractionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Quality thresholds ──

    pub fn page_acceptance_ratio(mut self, ratio: f64) -> Self {
        self.page_acceptance_ratio = Some(ratio);
        self
    }

    pub fn scanned_ratio(mut self, ratio: f64) -> Self {
        self.scanned_ratio = Some(ratio);
        self
    }

    // ── Page caps ──

    pub fn fast_page_cap(mut self, pages: usize) -> Self {
        self.fast_page_cap = Some(pages);
        self
    }

    pub fn layout_page_cap(mut self, pages: usize) -> Self {
        self.layout_page_cap = Some(pages);
        self
    }

    pub fn stream_page_cap(mut self, pages: usize) -> Self {
        self.stream_page_cap = Some(pages);
        self
    }

    // ── Plain text ──

    /// Replace the candidate encodings (WHATWG labels, tried in order).
    pub fn text_encodings(mut self, labels: Vec<String>) -> Self {
        self.text_encodings = Some(labels);
        self
    }

    pub fn build(self) -> Result<ExtractionConfig, ConfigError> {
        let ratio = |name: &'static str, value: Option<f64>, default: f64| {
            let value = value.unwrap_or(default);
            if (0.0..=1.0).contains(&value) {
                Ok(value)
            } else {
                Err(ConfigError::InvalidRatio { name, value })
            }
        };
        let cap = |name: &'static str, value: Option<usize>, default: usize| {
            match value.unwrap_or(default) {
                0 => Err(ConfigError::ZeroPageCap(name)),
                n => Ok(n),
            }
        };

        let text_encodings = match &self.text_encodings {
            Some(labels) => resolve_labels(labels.iter().map(String::as_str))?,
            None => resolve_labels(DEFAULT_TEXT_ENCODINGS.iter().copied())?,
        };

        Ok(ExtractionConfig {
            page_acceptance_ratio: ratio(
                "page_acceptance_ratio",
                self.page_acceptance_ratio,
                DEFAULT_PAGE_ACCEPTANCE_RATIO,
            )?,
            scanned_ratio: ratio("scanned_ratio", self.scanned_ratio, DEFAULT_SCANNED_RATIO)?,
            fast_page_cap: cap("fast_page_cap", self.fast_page_cap, DEFAULT_FAST_PAGE_CAP)?,
            layout_page_cap: cap(
                "layout_page_cap",
                self.layout_page_cap,
                DEFAULT_LAYOUT_PAGE_CAP,
            )?,
            stream_page_cap: cap(
                "stream_page_cap",
                self.stream_page_cap,
                DEFAULT_STREAM_PAGE_CAP,
            )?,
            text_encodings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractionConfig::default();
        assert!((config.page_acceptance_ratio() - 0.7).abs() < f64::EPSILON);
        assert!((config.scanned_ratio() - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.fast_page_cap(), 10);
        assert_eq!(config.layout_page_cap(), 20);
        assert_eq!(config.stream_page_cap(), 20);
        let names: Vec<&str> = config.text_encodings().iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["UTF-8", "GBK", "Big5", "windows-1252", "ISO-8859-15"]
        );
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let built = ExtractionConfigBuilder::new().build().unwrap();
        let default = ExtractionConfig::default();
        assert_eq!(built.fast_page_cap(), default.fast_page_cap());
        assert_eq!(built.text_encodings(), default.text_encodings());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ExtractionConfigBuilder::new()
            .page_acceptance_ratio(0.8)
            .scanned_ratio(0.25)
            .fast_page_cap(5)
            .layout_page_cap(30)
            .stream_page_cap(40)
            .text_encodings(vec!["utf-8".into(), "shift_jis".into()])
            .build()
            .unwrap();
        assert!((config.page_acceptance_ratio() - 0.8).abs() < f64::EPSILON);
        assert!((config.scanned_ratio() - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.fast_page_cap(), 5);
        assert_eq!(config.layout_page_cap(), 30);
        assert_eq!(config.stream_page_cap(), 40);
        assert_eq!(config.text_encodings().len(), 2);
        assert_eq!(config.text_encodings()[1].name(), "Shift_JIS");
    }

    #[test]
    fn test_builder_rejects_bad_ratio() {
        let err = ExtractionConfigBuilder::new()
            .page_acceptance_ratio(1.5)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRatio { name: "page_acceptance_ratio", .. }));
    }

    #[test]
    fn test_builder_rejects_zero_cap() {
        let err = ExtractionConfigBuilder::new().fast_page_cap(0).build().unwrap_err();
        assert_eq!(err, ConfigError::ZeroPageCap("fast_page_cap"));
    }

    #[test]
    fn test_builder_rejects_unknown_encoding() {
        let err = ExtractionConfigBuilder::new()
            .text_encodings(vec!["utf-8".into(), "klingon".into()])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownEncoding("klingon".into()));
    }

    #[test]
    fn test_builder_rejects_empty_encoding_list() {
        let err = ExtractionConfigBuilder::new()
            .text_encodings(vec![])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::NoEncodings);
    }

    #[test]
    fn test_duplicate_labels_collapse() {
        // "latin1" and "windows-1252" resolve to the same encoding
        let config = ExtractionConfigBuilder::new()
            .text_encodings(vec!["latin1".into(), "windows-1252".into()])
            .build()
            .unwrap();
        assert_eq!(config.text_encodings().len(), 1);
    }
}
