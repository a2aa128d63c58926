//! CLI binary for transcript2json.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ProcessorConfig`, runs the pipeline, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use transcript2json::{presenter, process, process_to_file, ProcessorConfig};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic processing (human-readable summary to stdout)
  transcript2json transcript.pdf

  # Write the normalized JSON record to a file
  transcript2json transcript.pdf -o record.json

  # Print the JSON record to stdout instead of the summary
  transcript2json --json transcript.pdf > record.json

  # Explicit config file
  transcript2json --config ./config.json transcript.pdf -o record.json

CONFIGURATION:
  Credentials are read from the config file (default: config.json) or, when
  the file is absent, from the environment:

    DOC_INTELLIGENCE_ENDPOINT   Text-extraction service endpoint
    DOC_INTELLIGENCE_KEY        Text-extraction service API key
    AZURE_OPENAI_ENDPOINT       Field-mapping service endpoint
    AZURE_OPENAI_KEY            Field-mapping service API key
    AZURE_OPENAI_DEPLOYMENT     Chat deployment name (default: gpt-35-turbo)

  Config file layout:
    {
      "document_intelligence": { "endpoint": "...", "key": "..." },
      "azure_openai": { "endpoint": "...", "key": "...", "deployment_name": "..." }
    }

  Missing field-mapping credentials are not an error: the run uses the
  built-in heuristic fallback parser and still exits 0. Missing extraction
  credentials are fatal — there is no local substitute for the text
  extraction service.
"#;

/// Extract an academic transcript PDF into a normalized JSON record.
#[derive(Parser, Debug)]
#[command(
    name = "transcript2json",
    version,
    about = "Extract academic transcript PDFs into a normalized JSON record",
    long_about = "Process an academic transcript PDF through a document-intelligence text \
extraction service and a language-model field-mapping service, producing one fixed JSON schema \
regardless of the issuing institution's layout. Falls back to heuristic parsing when the \
mapping service is unavailable.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF transcript file.
    pdf_path: PathBuf,

    /// Path to the JSON configuration file.
    #[arg(long, env = "TRANSCRIPT2JSON_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Write the normalized JSON record to this file.
    #[arg(short, long, env = "TRANSCRIPT2JSON_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the JSON record to stdout instead of the summary.
    #[arg(long, env = "TRANSCRIPT2JSON_JSON")]
    json: bool,

    /// Overall extraction deadline in seconds (polling included).
    #[arg(long, env = "TRANSCRIPT2JSON_EXTRACTION_TIMEOUT")]
    extraction_timeout: Option<u64>,

    /// Field-mapping call timeout in seconds.
    #[arg(long, env = "TRANSCRIPT2JSON_MAPPING_TIMEOUT")]
    mapping_timeout: Option<u64>,

    /// Disable the progress spinner.
    #[arg(long, env = "TRANSCRIPT2JSON_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TRANSCRIPT2JSON_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the requested record.
    #[arg(short, long, env = "TRANSCRIPT2JSON_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Warnings stay visible by default: "fell back to heuristic parsing" is
    // something the user should see even on a successful run.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut config = ProcessorConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;
    if let Some(secs) = cli.extraction_timeout {
        config.extraction_timeout_secs = secs;
    }
    if let Some(secs) = cli.mapping_timeout {
        config.mapping_timeout_secs = secs;
    }

    // ── Progress spinner ─────────────────────────────────────────────────
    // The pipeline is two sequential network calls; a spinner is all the
    // feedback there is to give.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let spinner = if show_progress {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Processing");
        bar.set_message(format!("{}", cli.pdf_path.display()));
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    // ── Run the pipeline ─────────────────────────────────────────────────
    let record = if let Some(ref output_path) = cli.output {
        process_to_file(&cli.pdf_path, output_path, &config)
            .await
            .context("Transcript processing failed")?
    } else {
        process(&cli.pdf_path, &config)
            .await
            .context("Transcript processing failed")?
    };

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    // ── Present results ──────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&record).context("Failed to serialise record")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .and_then(|_| handle.write_all(b"\n"))
            .context("Failed to write to stdout")?;
    } else if !cli.quiet {
        print!("{}", presenter::render_summary(&record));
    }

    if !cli.quiet {
        let stats = &record.academic_record.summary_statistics;
        if let Some(ref output_path) = cli.output {
            eprintln!(
                "{}  {} courses, {} credits attempted  →  {}",
                green("✔"),
                stats.total_courses,
                stats.total_credits_attempted,
                bold(&output_path.display().to_string()),
            );
        } else {
            eprintln!(
                "{}  {} courses extracted from {}",
                cyan("◆"),
                stats.total_courses,
                dim(&record.metadata.source_file),
            );
        }
    }

    Ok(())
}
