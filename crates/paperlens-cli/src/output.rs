use std::io::Write;

use owo_colors::OwoColorize;
use paperlens_core::{DocumentFormat, ExtractionResult};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the one-paragraph summary that precedes the extracted text.
pub fn print_summary(
    w: &mut dyn Write,
    file_name: &str,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Extracting text from {}...", file_name)?;

    let mut details = format!("format: {}", result.format);
    if let Some(strategy) = &result.strategy {
        details.push_str(&format!(", strategy: {}", strategy));
    }
    if result.format == DocumentFormat::Pdf {
        details.push_str(&format!(
            ", pages: {}/{}",
            result.pages_processed, result.pages_total
        ));
    }
    details.push_str(&format!(", {} chars", result.text.chars().count()));
    if color.enabled() {
        writeln!(w, "{}", format!("({})", details).dimmed())?;
    } else {
        writeln!(w, "({})", details)?;
    }

    if result.truncated {
        let msg = format!(
            "Only the first {} of {} pages were read.",
            result.pages_processed, result.pages_total
        );
        print_warning(w, &msg, color)?;
    }
    if result.likely_scanned {
        print_warning(
            w,
            "The first page has no usable text layer; this may be a scanned document.",
            color,
        )?;
    }

    if result.usable {
        if color.enabled() {
            writeln!(w, "{}", "USABLE".green().bold())?;
        } else {
            writeln!(w, "USABLE")?;
        }
    } else {
        let diagnostic = result.diagnostic.as_deref().unwrap_or("not usable");
        if color.enabled() {
            writeln!(w, "{} {}", "NOT USABLE:".red().bold(), diagnostic)?;
        } else {
            writeln!(w, "NOT USABLE: {}", diagnostic)?;
        }
    }
    writeln!(w)?;
    Ok(())
}

fn print_warning(w: &mut dyn Write, msg: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "WARNING:".yellow(), msg)
    } else {
        writeln!(w, "WARNING: {}", msg)
    }
}

/// Print the extracted text itself, nothing else.
pub fn print_text(w: &mut dyn Write, result: &ExtractionResult) -> std::io::Result<()> {
    if result.text.is_empty() {
        return Ok(());
    }
    write!(w, "{}", result.text)?;
    if !result.text.ends_with('\n') {
        writeln!(w)?;
    }
    Ok(())
}

/// Print the detected format of a file.
pub fn print_format(
    w: &mut dyn Write,
    file_name: &str,
    format: DocumentFormat,
    color: ColorMode,
) -> std::io::Result<()> {
    let label = format.as_str();
    if !color.enabled() {
        return writeln!(w, "{}: {}", file_name, label);
    }
    match format {
        DocumentFormat::Unknown => writeln!(w, "{}: {}", file_name, label.red()),
        _ => writeln!(w, "{}: {}", file_name, label.cyan()),
    }
}
