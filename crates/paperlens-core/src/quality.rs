//! Printable-character ratio and the final quality gate.

use crate::{ExtractError, ExtractionConfig, ExtractionResult};

/// True for characters a reader would see as text.
///
/// Control characters, the U+FFFD replacement character, zero-width and
/// bidi format characters, and private-use code points count as noise.
fn is_printable(c: char) -> bool {
    if c.is_whitespace() {
        return true;
    }
    if c.is_control() || c == '\u{FFFD}' {
        return false;
    }
    !matches!(
        c,
        '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{FEFF}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{F0000}'..='\u{10FFFF}'
    )
}

/// Fraction of characters in `text` that are printable or whitespace.
///
/// Returns 0.0 for an empty string.
pub fn printable_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut printable = 0usize;
    for c in text.chars() {
        total += 1;
        if is_printable(c) {
            printable += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    printable as f64 / total as f64
}

/// Decide whether extracted text is fit to hand downstream.
///
/// Blank text is [`ExtractError::EmptyContent`]; text whose printable ratio
/// does not exceed the document-level threshold is
/// [`ExtractError::Unreadable`].
pub fn classify(text: &str, config: &ExtractionConfig) -> Result<(), ExtractError> {
    if text.trim().is_empty() {
        return Err(ExtractError::EmptyContent);
    }
    if printable_ratio(text) <= config.scanned_ratio() {
        return Err(ExtractError::Unreadable);
    }
    Ok(())
}

/// Apply the quality gate to a pipeline result, whatever its format.
///
/// A result that already failed keeps its more specific diagnostic.
pub fn finalize(mut result: ExtractionResult, config: &ExtractionConfig) -> ExtractionResult {
    if let Some(err) = &result.error {
        result.usable = false;
        result.diagnostic.get_or_insert_with(|| err.to_string());
        return result;
    }

    match classify(&result.text, config) {
        Ok(()) => {
            result.usable = true;
            result.diagnostic = None;
        }
        Err(err) => {
            tracing::debug!(format = %result.format, error = %err, "quality gate rejected text");
            result.usable = false;
            result.diagnostic = Some(err.to_string());
            result.error = Some(err);
        }
    }
    result
}
