use mupdf::{Document, Rect, TextLine, TextPage, TextPageFlags};

use paperlens_core::config::{DEFAULT_LAYOUT_PAGE_CAP, DEFAULT_PAGE_ACCEPTANCE_RATIO};
use paperlens_core::{
    BackendError, ExtractionConfig, PdfStrategy, StrategyOutput, join_pages, printable_ratio,
};

mod table;

pub use table::{CellBox, rows_to_table};

/// MuPDF-based layout-aware reader, the second link of the PDF chain.
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that builds without the `mupdf` feature of
/// `paperlens-extract` do not transitively depend on it.
///
/// Page text is read block by block, skipping running headers (top 4% of
/// the page) and footers (bottom 5%). Body lines that line up as a grid are
/// emitted as pipe-delimited table rows.
pub struct MupdfStrategy {
    max_pages: usize,
    page_acceptance_ratio: f64,
    /// Fraction of page height from bottom to exclude as footer (0.0 to 1.0).
    /// Default 0.05. `None` disables footer exclusion.
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0 to 1.0).
    /// Default 0.04. `None` disables header exclusion.
    header_exclusion_ratio: Option<f32>,
}

impl Default for MupdfStrategy {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_LAYOUT_PAGE_CAP,
            page_acceptance_ratio: DEFAULT_PAGE_ACCEPTANCE_RATIO,
            footer_exclusion_ratio: Some(0.05),
            header_exclusion_ratio: Some(0.04),
        }
    }
}

impl MupdfStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the page cap and acceptance threshold from an [`ExtractionConfig`].
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::default()
            .with_max_pages(config.layout_page_cap())
            .with_page_acceptance_ratio(config.page_acceptance_ratio())
    }

    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    pub fn with_page_acceptance_ratio(mut self, ratio: f64) -> Self {
        self.page_acceptance_ratio = ratio;
        self
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Lines outside the header and footer bands, as block text and as
    /// positioned cells for the table pass.
    fn body_lines(&self, text_page: &TextPage, page_bounds: &Rect) -> (String, Vec<CellBox>) {
        let page_height = page_bounds.y1 - page_bounds.y0;
        let header_threshold = self
            .header_exclusion_ratio
            .map(|r| page_bounds.y0 + page_height * r);
        let footer_threshold = self
            .footer_exclusion_ratio
            .map(|r| page_bounds.y1 - page_height * r);

        let mut page_text = String::new();
        let mut cells = Vec::new();
        for block in text_page.blocks() {
            let block_bounds = block.bounds();

            // Skip blocks entirely within the header region
            if let Some(threshold) = header_threshold
                && block_bounds.y1 <= threshold
            {
                continue;
            }

            // Skip blocks whose top edge is in the footer region
            if let Some(threshold) = footer_threshold
                && block_bounds.y0 >= threshold
            {
                continue;
            }

            for line in block.lines() {
                let text = line_text(&line);
                page_text.push_str(&text);
                page_text.push('\n');

                let bounds = line.bounds();
                cells.push(CellBox {
                    x0: bounds.x0,
                    y0: bounds.y0,
                    y1: bounds.y1,
                    text,
                });
            }
        }
        (page_text, cells)
    }

    fn extract_page(&self, document: &Document, index: usize) -> Result<String, mupdf::Error> {
        let page = document.load_page(index as i32)?;
        let text_page = page.to_text_page(TextPageFlags::empty())?;
        let bounds = page.bounds()?;

        let (text, cells) = self.body_lines(&text_page, &bounds);
        Ok(rows_to_table(cells).unwrap_or(text))
    }
}

fn line_text(line: &TextLine<'_>) -> String {
    line.chars()
        .map(|c| c.char().unwrap_or('\u{FFFD}'))
        .collect()
}

impl PdfStrategy for MupdfStrategy {
    fn name(&self) -> &'static str {
        "mupdf"
    }

    fn extract(&self, bytes: &[u8]) -> Result<StrategyOutput, BackendError> {
        let mut document = Document::from_bytes(bytes, "application/pdf")
            .map_err(|e| BackendError::OpenError(e.to_string()))?;

        let needs_password = document
            .needs_password()
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        if needs_password
            && !document
                .authenticate("")
                .map_err(|e| BackendError::OpenError(e.to_string()))?
        {
            return Err(BackendError::Encrypted);
        }

        let pages_total = document
            .page_count()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
            .max(0) as usize;
        let pages_processed = pages_total.min(self.max_pages);

        let mut accepted = Vec::new();
        for index in 0..pages_processed {
            match self.extract_page(&document, index) {
                Ok(text) if text.trim().is_empty() => {
                    tracing::debug!(page = index + 1, "mupdf: no text on page");
                }
                Ok(text) => {
                    let ratio = printable_ratio(&text);
                    if ratio > self.page_acceptance_ratio {
                        accepted.push((index + 1, text));
                    } else {
                        tracing::debug!(page = index + 1, ratio, "mupdf: page rejected as noise");
                    }
                }
                Err(e) => {
                    tracing::debug!(page = index + 1, error = %e, "mupdf: page failed");
                }
            }
        }

        Ok(StrategyOutput {
            text: join_pages(&accepted),
            pages_processed,
            pages_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Object, Stream, dictionary};

    /// One-page Helvetica PDF (612x792) with the given content stream.
    fn single_page_pdf(content: &str) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    fn show(x: u32, y: u32, text: &str) -> String {
        format!("BT /F1 12 Tf 1 0 0 1 {x} {y} Tm ({text}) Tj ET\n")
    }

    #[test]
    fn body_grid_becomes_pipe_rows() {
        let content = [
            show(72, 600, "Catalyst"),
            show(360, 600, "Yield"),
            show(72, 580, "Pd/C"),
            show(360, 580, "92"),
        ]
        .concat();
        let out = MupdfStrategy::new()
            .extract(&single_page_pdf(&content))
            .unwrap();
        assert!(out.text.contains("| Catalyst | Yield |"), "{}", out.text);
        assert!(out.text.contains("| Pd/C | 92 |"), "{}", out.text);
    }

    #[test]
    fn header_band_text_is_not_resurrected() {
        // y = 780 sits in the top 4% of a 792pt page.
        let content = [show(72, 780, "Journal of Things"), show(360, 780, "Vol 3")].concat();
        let out = MupdfStrategy::new()
            .extract(&single_page_pdf(&content))
            .unwrap();
        assert!(out.is_empty(), "{}", out.text);
        assert_eq!(out.pages_total, 1);
    }

    #[test]
    fn prose_page_keeps_block_text() {
        let out = MupdfStrategy::new()
            .extract(&single_page_pdf(&show(72, 600, "Photosynthesis fixes carbon")))
            .unwrap();
        assert!(out.text.contains("Photosynthesis fixes carbon"));
        assert!(!out.text.contains('|'));
    }

    #[test]
    fn from_config_uses_layout_cap() {
        let config = paperlens_core::ExtractionConfigBuilder::new()
            .layout_page_cap(7)
            .page_acceptance_ratio(0.5)
            .build()
            .unwrap();
        let strategy = MupdfStrategy::from_config(&config);
        assert_eq!(strategy.max_pages, 7);
        assert!((strategy.page_acceptance_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn exclusion_zero_disables() {
        let strategy = MupdfStrategy::new()
            .with_footer_exclusion(0.0)
            .with_header_exclusion(0.1);
        assert!(strategy.footer_exclusion_ratio.is_none());
        assert_eq!(strategy.header_exclusion_ratio, Some(0.1));
    }

    #[test]
    fn garbage_bytes_yield_nothing() {
        let result = MupdfStrategy::new().extract(b"definitely not a pdf");
        assert!(result.map(|out| out.is_empty()).unwrap_or(true));
    }
}
