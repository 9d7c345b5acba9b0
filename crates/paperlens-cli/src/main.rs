use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paperlens_core::config_file::{self, ConfigFile};
use paperlens_core::{RawDocument, sniff};
use paperlens_extract::Extractor;

mod output;

use output::ColorMode;

/// PaperLens - Extract readable text from uploaded papers (PDF, DOCX, TXT)
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract text from a PDF, DOCX or TXT file
    Extract {
        /// Path to the document
        file_path: PathBuf,

        /// Print the full result as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Write output to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Extra TOML config file, applied over the default config cascade
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the format a file would be handled as
    Sniff {
        /// Path to the document
        file_path: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for text or JSON.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract {
            file_path,
            json,
            no_color,
            output,
            config,
        } => extract(&file_path, json, no_color, output, config),
        Command::Sniff {
            file_path,
            no_color,
        } => sniff_file(&file_path, no_color),
    }
}

/// Resolve the config cascade: platform file, then `./.paperlens.toml`,
/// then `--config`.
fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<ConfigFile> {
    let mut file = config_file::load_config();
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        let overlay = config_file::load_from_path(path)
            .ok_or_else(|| anyhow::anyhow!("Could not parse config file {}", path.display()))?;
        file = config_file::merge(file, overlay);
    }
    Ok(file)
}

fn read_input(file_path: &Path) -> anyhow::Result<Vec<u8>> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }
    std::fs::read(file_path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file_path.display(), e))
}

fn display_name(file_path: &Path) -> String {
    file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string())
}

fn extract(
    file_path: &Path,
    json: bool,
    no_color: bool,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let config = resolve_config(config.as_deref())?
        .extraction_builder()
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid extraction config: {}", e))?;

    let bytes = read_input(file_path)?;
    let file_name = display_name(file_path);

    let use_color = !no_color && output.is_none() && !json;
    let color = ColorMode(use_color);

    let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    };

    let extractor = Extractor::with_config(config);
    let result = extractor.extract(RawDocument::new(&bytes, &file_name));

    if json {
        serde_json::to_writer_pretty(&mut writer, &result)?;
        writeln!(writer)?;
    } else {
        output::print_summary(&mut writer, &file_name, &result, color)?;
        output::print_text(&mut writer, &result)?;
    }
    writer.flush()?;

    if let Some(path) = output {
        eprintln!("Output written to {}", path.display());
    }

    Ok(if result.usable {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn sniff_file(file_path: &Path, no_color: bool) -> anyhow::Result<ExitCode> {
    let bytes = read_input(file_path)?;
    let file_name = display_name(file_path);
    let format = sniff(&file_name, &bytes);

    let mut stdout = std::io::stdout();
    output::print_format(&mut stdout, &file_name, format, ColorMode(!no_color))?;
    Ok(ExitCode::SUCCESS)
}
