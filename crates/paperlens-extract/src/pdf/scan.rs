//! First-page check for image-only (scanned) PDFs.

use paperlens_core::{PDF_MAGIC, printable_ratio};

use super::lopdf_reader;

/// What the first page of a PDF looked like to the lightweight reader.
#[derive(Debug, Clone, PartialEq)]
pub enum FirstPage {
    /// The buffer does not start with `%PDF-`.
    BadSignature,
    /// lopdf could not open the document at all.
    Unopenable,
    /// Encrypted and not readable with an empty password here (wrong
    /// password or unsupported cipher); the page cannot be inspected.
    Encrypted,
    NoPages,
    Text(String),
}

/// Probe the first page of `bytes`.
pub fn probe(bytes: &[u8]) -> FirstPage {
    if !bytes.starts_with(PDF_MAGIC) {
        return FirstPage::BadSignature;
    }
    let document = match lopdf_reader::load(bytes) {
        Ok(document) => document,
        Err(lopdf::Error::Decryption(e)) => {
            tracing::debug!(error = ?e, "scan check: cannot decrypt document");
            return FirstPage::Encrypted;
        }
        Err(e) => {
            tracing::debug!(error = %e, "scan check: cannot open document");
            return FirstPage::Unopenable;
        }
    };
    let Some(&first) = document.get_pages().keys().next() else {
        return FirstPage::NoPages;
    };
    FirstPage::Text(document.extract_text(&[first]).unwrap_or_default())
}

/// True when the first page gives no sign of a text layer.
pub fn looks_scanned(first_page: &FirstPage, threshold: f64) -> bool {
    match first_page {
        FirstPage::BadSignature | FirstPage::Unopenable | FirstPage::NoPages => true,
        FirstPage::Encrypted => false,
        FirstPage::Text(text) => text.trim().is_empty() || printable_ratio(text) < threshold,
    }
}

/// Advisory scanned-document flag for `bytes`.
pub fn likely_scanned(bytes: &[u8], threshold: f64) -> bool {
    looks_scanned(&probe(bytes), threshold)
}
