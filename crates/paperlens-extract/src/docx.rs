//! DOCX paragraph text, read straight from `word/document.xml`.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use paperlens_core::{DocumentFormat, ExtractError, ExtractionResult};

const DOCUMENT_PART: &str = "word/document.xml";

/// Upper bound on the decompressed main part, against zip bombs.
const MAX_DOCUMENT_XML_BYTES: u64 = 64 * 1024 * 1024;

/// Collect the text of every paragraph, one line per non-blank paragraph.
///
/// Runs inside a paragraph are concatenated; `<w:tab/>` becomes a tab and
/// `<w:br/>`/`<w:cr/>` a space, so a paragraph always stays on one line.
pub fn extract_paragraphs(bytes: &[u8]) -> Result<String, ExtractError> {
    let xml = read_document_xml(bytes)?;
    let paragraphs = paragraphs_from_xml(&xml)?;
    if paragraphs.is_empty() {
        return Err(ExtractError::NoTextFound);
    }
    Ok(paragraphs.join("\n"))
}

fn read_document_xml(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::StructuralParseFailure(format!("not a DOCX container: {e}")))?;
    let part = archive.by_name(DOCUMENT_PART).map_err(|e| {
        ExtractError::StructuralParseFailure(format!("missing {DOCUMENT_PART}: {e}"))
    })?;

    let mut xml = String::new();
    part.take(MAX_DOCUMENT_XML_BYTES)
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::StructuralParseFailure(format!("reading {DOCUMENT_PART}: {e}")))?;
    Ok(xml)
}

fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            ExtractError::StructuralParseFailure(format!(
                "{DOCUMENT_PART} at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => flush(&mut current, &mut paragraphs),
                b"t" => in_text = true,
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push(' '),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push(' '),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(|e| {
                    ExtractError::StructuralParseFailure(format!("{DOCUMENT_PART}: {e}"))
                })?;
                current.push_str(&text);
            }
            Event::CData(c) if in_text => {
                current.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => flush(&mut current, &mut paragraphs),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    flush(&mut current, &mut paragraphs);
    Ok(paragraphs)
}

fn flush(current: &mut String, paragraphs: &mut Vec<String>) {
    let text = std::mem::take(current);
    if !text.trim().is_empty() {
        paragraphs.push(text);
    }
}

/// Run the DOCX path and wrap the outcome in an [`ExtractionResult`].
pub fn extract(bytes: &[u8]) -> ExtractionResult {
    match extract_paragraphs(bytes) {
        Ok(text) => ExtractionResult::from_text(DocumentFormat::Docx, text),
        Err(err) => {
            tracing::debug!(error = %err, "docx extraction failed");
            ExtractionResult::failure(DocumentFormat::Docx, err)
        }
    }
}
