use std::path::Path;

use crate::DocumentFormat;

/// Leading bytes of every PDF file.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Decide the document format from its leading bytes and declared filename.
///
/// The PDF signature wins over the extension; otherwise the lowercased
/// extension decides (`.pdf`, `.docx`, `.txt`).
pub fn sniff(filename: &str, bytes: &[u8]) -> DocumentFormat {
    if bytes.starts_with(PDF_MAGIC) {
        return DocumentFormat::Pdf;
    }

    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "pdf" => DocumentFormat::Pdf,
        "docx" => DocumentFormat::Docx,
        "txt" => DocumentFormat::Txt,
        _ => DocumentFormat::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_beats_extension() {
        for name in ["paper.txt", "paper.docx", "paper", "", "PAPER.PNG"] {
            assert_eq!(sniff(name, b"%PDF-1.7\n..."), DocumentFormat::Pdf, "{name}");
        }
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(sniff("Notes.TXT", b"hello"), DocumentFormat::Txt);
        assert_eq!(sniff("thesis.Docx", b"PK\x03\x04"), DocumentFormat::Docx);
        assert_eq!(sniff("scan.PDF", b""), DocumentFormat::Pdf);
    }

    #[test]
    fn unknown_without_signature_or_extension() {
        assert_eq!(sniff("", b"hello"), DocumentFormat::Unknown);
        assert_eq!(sniff("figure.png", b"\x89PNG"), DocumentFormat::Unknown);
        assert_eq!(sniff("archive.tar.gz", b"\x1f\x8b"), DocumentFormat::Unknown);
    }

    #[test]
    fn partial_signature_is_not_pdf() {
        assert_eq!(sniff("x.txt", b"%PDF"), DocumentFormat::Txt);
    }
}
