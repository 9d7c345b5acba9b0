//! Plain-text decoding over an ordered list of candidate encodings.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

use paperlens_core::{DocumentFormat, ExtractError, ExtractionResult};

/// Text decoded from raw bytes, with the encoding that accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static Encoding,
}

/// Decode `bytes` with the first candidate that accepts them without errors.
///
/// A byte-order mark wins over the candidate list and is stripped. After
/// UTF-8, the legacy encoding chardetng guesses is tried first, since
/// double-byte encodings like GBK also accept most Big5 input.
pub fn decode_text(
    bytes: &[u8],
    candidates: &[&'static Encoding],
) -> Result<Decoded, ExtractError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes)
        && let Some(text) =
            encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
    {
        return Ok(Decoded {
            text: text.into_owned(),
            encoding,
        });
    }

    for encoding in candidate_order(bytes, candidates) {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            tracing::debug!(encoding = encoding.name(), "text decoded");
            return Ok(Decoded {
                text: text.into_owned(),
                encoding,
            });
        }
        tracing::trace!(encoding = encoding.name(), "candidate rejected");
    }
    Err(ExtractError::UndecodableText)
}

fn candidate_order(bytes: &[u8], candidates: &[&'static Encoding]) -> Vec<&'static Encoding> {
    let mut order = candidates.to_vec();

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guess = detector.guess(None, true);
    if guess == UTF_8 {
        return order;
    }

    let front = usize::from(order.first() == Some(&UTF_8));
    if let Some(pos) = order.iter().position(|e| *e == guess)
        && pos > front
    {
        let promoted = order.remove(pos);
        order.insert(front, promoted);
    }
    order
}

/// Run the plain-text path and wrap the outcome in an [`ExtractionResult`].
pub fn extract(bytes: &[u8], candidates: &[&'static Encoding]) -> ExtractionResult {
    match decode_text(bytes, candidates) {
        Ok(decoded) => ExtractionResult::from_text(DocumentFormat::Txt, decoded.text),
        Err(err) => ExtractionResult::failure(DocumentFormat::Txt, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{BIG5, GBK, ISO_8859_15, SHIFT_JIS, WINDOWS_1252};

    fn defaults() -> Vec<&'static Encoding> {
        paperlens_core::ExtractionConfig::default()
            .text_encodings()
            .to_vec()
    }

    #[test]
    fn utf8_passes_through() {
        let d = decode_text("Enzyme kinetics: Vmax, Km".as_bytes(), &defaults()).unwrap();
        assert_eq!(d.text, "Enzyme kinetics: Vmax, Km");
        assert_eq!(d.encoding, UTF_8);
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("abstract".as_bytes());
        let d = decode_text(&bytes, &defaults()).unwrap();
        assert_eq!(d.text, "abstract");
    }

    #[test]
    fn gbk_chinese_round_trips() {
        let original = "细胞膜的流动镶嵌模型描述了磷脂双分子层的结构。";
        let (bytes, _, had_errors) = GBK.encode(original);
        assert!(!had_errors);
        let d = decode_text(&bytes, &defaults()).unwrap();
        assert_eq!(d.text, original);
    }

    #[test]
    fn big5_chinese_round_trips() {
        let original = "細胞膜的流動鑲嵌模型描述了磷脂雙分子層的結構。\n\
            本研究探討蛋白質在細胞膜上的運動與擴散，並討論溫度對膜流動性的影響。";
        let (bytes, _, had_errors) = BIG5.encode(original);
        assert!(!had_errors);
        let d = decode_text(&bytes, &defaults()).unwrap();
        assert_eq!(d.text, original);
        assert_eq!(d.encoding, BIG5);
    }

    #[test]
    fn latin1_falls_through_to_single_byte() {
        let bytes = b"Caf\xe9 au lait, na\xefve r\xe9sum\xe9";
        let d = decode_text(bytes, &[UTF_8, WINDOWS_1252]).unwrap();
        assert_eq!(d.text, "Café au lait, naïve résumé");
    }

    #[test]
    fn default_list_decodes_every_byte() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        assert!(decode_text(&bytes, &defaults()).is_ok());
        assert!(decode_text(&bytes, &[WINDOWS_1252]).is_ok());
    }

    #[test]
    fn iso_8859_15_applies_only_without_windows_1252_ahead() {
        let bytes = b"Price: 12 \xa4";
        let d = decode_text(bytes, &[UTF_8, ISO_8859_15]).unwrap();
        assert_eq!(d.text, "Price: 12 \u{20ac}");
        assert_eq!(d.encoding, ISO_8859_15);

        let d = decode_text(bytes, &[UTF_8, WINDOWS_1252, ISO_8859_15]).unwrap();
        assert_eq!(d.text, "Price: 12 \u{a4}");
        assert_eq!(d.encoding, WINDOWS_1252);
    }

    #[test]
    fn undecodable_with_strict_candidates() {
        // 0xFF is invalid in both UTF-8 and Shift_JIS
        let err = decode_text(&[0xFF, 0xFF, 0xFE], &[UTF_8, SHIFT_JIS]).unwrap_err();
        assert_eq!(err, ExtractError::UndecodableText);
    }

    #[test]
    fn extract_wraps_failure() {
        let r = extract(&[0xFF, 0xFF], &[UTF_8]);
        assert_eq!(r.format, DocumentFormat::Txt);
        assert_eq!(r.error, Some(ExtractError::UndecodableText));
        assert_eq!(r.diagnostic.as_deref(), Some("undecodable text encoding"));
    }
}
