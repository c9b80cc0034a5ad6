use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mdformat::{Config, ExportError, SAMPLE_MARKDOWN};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Html,
    Docx,
    Pdf,
    Text,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Docx => "docx",
            Format::Pdf => "pdf",
            Format::Text => "txt",
        }
    }

    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(Format::Html),
            "docx" => Some(Format::Docx),
            "pdf" => Some(Format::Pdf),
            "txt" => Some(Format::Text),
            _ => None,
        }
    }

    fn is_binary(self) -> bool {
        matches!(self, Format::Docx | Format::Pdf)
    }
}

#[derive(Parser)]
#[command(name = "mdformat")]
#[command(about = "Convert Markdown to an HTML preview, DOCX, PDF or plain text")]
#[command(version)]
struct Cli {
    /// Input Markdown file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Output file (defaults to stdout for html/text, input name for docx/pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (defaults to the output extension, else html)
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Config file
    #[arg(short, long, default_value = "mdformat.toml")]
    config: PathBuf,

    /// Convert the bundled sample document instead of an input
    #[arg(long, conflicts_with = "input")]
    sample: bool,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ExportError> {
    let config = Config::load(&cli.config);
    debug!(path = %cli.config.display(), "loaded config");

    let markdown = read_input(cli)?;
    let format = cli
        .format
        .or_else(|| cli.output.as_deref().and_then(Format::from_path))
        .unwrap_or(Format::Html);

    let bytes = match format {
        Format::Html => mdformat::markdown_to_html_with_config(&markdown, &config)?.into_bytes(),
        Format::Text => mdformat::markdown_to_text_with_config(&markdown, &config)?.into_bytes(),
        Format::Docx => mdformat::markdown_to_docx_with_config(&markdown, &config)?,
        Format::Pdf => mdformat::markdown_to_pdf_with_config(&markdown, &config)?,
    };

    match output_path(cli, format) {
        Some(path) => {
            fs::write(&path, bytes)?;
            info!(path = %path.display(), ?format, "wrote output");
            println!("Created {}", path.display());
        }
        None => io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

fn read_input(cli: &Cli) -> io::Result<String> {
    if cli.sample {
        return Ok(SAMPLE_MARKDOWN.to_string());
    }
    match &cli.input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Where to write. Binary formats never go to stdout.
fn output_path(cli: &Cli, format: Format) -> Option<PathBuf> {
    if let Some(output) = &cli.output {
        return Some(output.clone());
    }
    if !format.is_binary() {
        return None;
    }
    let stem = cli
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from("markdown_document"));
    Some(stem.with_extension(format.extension()))
}
