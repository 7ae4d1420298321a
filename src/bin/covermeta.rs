//! CLI binary for edgequake-covermeta.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_covermeta::pipeline::input::file_name_of;
use edgequake_covermeta::{
    extract, extract_from_file_name, CoverMetaError, ExtractionConfig, ExtractionOutput,
    ExtractionProgressCallback, MetadataSource, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback ────────────────────────────────────────────────────

/// Prints the stage lines to stdout and, optionally, a spinner on stderr.
///
/// Stage lines go through `ProgressBar::suspend` so they never interleave
/// with a spinner frame.
struct CliProgressCallback {
    spinner: Option<ProgressBar>,
    analysis_label: &'static str,
}

impl CliProgressCallback {
    fn new(show_spinner: bool, analysis_label: &'static str) -> Arc<Self> {
        let spinner = show_spinner.then(|| {
            let bar = ProgressBar::new_spinner();
            let style = ProgressStyle::with_template("{spinner:.cyan} {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
            bar.set_style(style);
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        Arc::new(Self {
            spinner,
            analysis_label,
        })
    }

    fn line(&self, text: &str) {
        match &self.spinner {
            Some(bar) => bar.suspend(|| println!("{text}")),
            None => println!("{text}"),
        }
    }

    fn status(&self, msg: String) {
        if let Some(bar) = &self.spinner {
            bar.set_message(msg);
        }
    }

    fn finish(&self) {
        if let Some(bar) = &self.spinner {
            bar.finish_and_clear();
        }
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_upload_start(&self, file_name: &str, size_bytes: u64) {
        self.line(&format!("Uploading {file_name}..."));
        self.status(format!(
            "uploading {:.2} MB",
            size_bytes as f64 / 1024.0 / 1024.0
        ));
    }

    fn on_upload_complete(&self, uri: &str) {
        self.line(&format!("OK: {uri}"));
    }

    fn on_upload_rejected(&self, _status: u16) {
        self.finish();
    }

    fn on_analysis_start(&self) {
        self.line(&format!("\n{}", self.analysis_label));
        self.status("letting the upload settle, then waiting for the model".into());
    }

    fn on_analysis_complete(&self, _filled_fields: usize) {
        self.finish();
    }

    fn on_fallback(&self, reason: &str) {
        let warning = format!("{} cover analysis failed: {}", cyan("⚠"), dim(reason));
        match &self.spinner {
            Some(bar) => bar.suspend(|| eprintln!("{warning}")),
            None => eprintln!("{warning}"),
        }
        self.line("\nAnalyzing file name...");
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract cover metadata (prints JSON to stdout)
  covermeta textbook.pdf

  # Save the JSON to a file
  covermeta textbook.pdf -o textbook.json

  # Skip the upload and guess from the file name
  covermeta --from-filename "Math Grade 3 Vol 1.pdf"

  # Try the cover first, fall back to the file name if analysis fails
  covermeta --fallback-to-filename textbook.pdf

  # Constrain the answer with a response schema, low temperature
  covermeta --schema --temperature 0.1 textbook.pdf

OUTPUT:
  Uploading textbook.pdf...
  OK: https://generativelanguage.googleapis.com/v1beta/files/abc123

  Analyzing cover...
  {
    "title": "...",
    ...
  }

  If the upload is rejected, the status code and raw response body are
  printed and the program exits with status 0 without analysing.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY              Gemini API key (required)
  COVERMETA_BASE_URL          Override the API root (proxies, tests)
  COVERMETA_MODEL             Override the model ID
  COVERMETA_SETTLE_DELAY_MS   Delay between upload and analysis
  RUST_LOG                    Override the log filter (e.g. debug)
"#;

/// Extract book metadata from a PDF cover with Gemini.
#[derive(Parser, Debug)]
#[command(
    name = "covermeta",
    version,
    about = "Extract book metadata from a PDF cover with Gemini",
    long_about = "Upload a PDF to the Gemini File API, ask the model to read the cover, and \
print title, author, subject, grade, publisher and publishDate as JSON.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: String,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API root URL.
    #[arg(long, env = "COVERMETA_BASE_URL",
          default_value = edgequake_covermeta::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Model ID.
    #[arg(long, env = "COVERMETA_MODEL",
          default_value = edgequake_covermeta::config::DEFAULT_MODEL)]
    model: String,

    /// Milliseconds to wait between upload and analysis.
    #[arg(long, env = "COVERMETA_SETTLE_DELAY_MS",
          default_value_t = edgequake_covermeta::config::DEFAULT_SETTLE_DELAY_MS)]
    settle_delay_ms: u64,

    /// Per-request timeout in seconds (default: none).
    #[arg(long, env = "COVERMETA_TIMEOUT")]
    timeout: Option<u64>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "COVERMETA_TEMPERATURE")]
    temperature: Option<f32>,

    /// Send a response schema for the six fields.
    #[arg(long, env = "COVERMETA_SCHEMA")]
    schema: bool,

    /// Path to a text file containing a custom cover prompt.
    #[arg(long, env = "COVERMETA_PROMPT")]
    prompt: Option<PathBuf>,

    /// Infer metadata from the file name only; nothing is uploaded.
    #[arg(long)]
    from_filename: bool,

    /// Fall back to file-name inference when cover analysis fails, and to a
    /// built-in default (title from the file name) when that fails too.
    #[arg(long, env = "COVERMETA_FALLBACK")]
    fallback_to_filename: bool,

    /// Write the JSON to this file instead of stdout.
    #[arg(short, long, env = "COVERMETA_OUTPUT")]
    output: Option<PathBuf>,

    /// Disable the spinner.
    #[arg(long, env = "COVERMETA_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "COVERMETA_VERBOSE")]
    verbose: bool,

    /// Print only the JSON (or errors).
    #[arg(short, long, env = "COVERMETA_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Progress lines already tell the user what is happening; keep library
    // INFO logs out of the way unless asked for.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<Arc<CliProgressCallback>> = if cli.quiet {
        None
    } else {
        let label = if cli.from_filename {
            "Analyzing file name..."
        } else {
            "Analyzing cover..."
        };
        Some(CliProgressCallback::new(!cli.no_progress && !cli.verbose, label))
    };

    let config = build_config(
        &cli,
        progress.clone().map(|p| p as ProgressCallback),
    )
    .await?;

    // ── Run extraction ───────────────────────────────────────────────────
    let result = if cli.from_filename {
        let file_name = file_name_of(Path::new(&cli.input));
        extract_from_file_name(&file_name, &config).await
    } else {
        extract(&cli.input, &config).await
    };

    if let Some(ref p) = progress {
        p.finish();
    }

    let Some(output) = take_output(result, &mut io::stdout())? else {
        return Ok(());
    };

    // ── Emit result ──────────────────────────────────────────────────────
    match cli.output {
        Some(ref path) => {
            output
                .save_json(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !cli.quiet {
                print_summary(&output, Some(path));
            }
        }
        None => {
            println!("{}", output.to_pretty_json());
            if cli.verbose {
                print_summary(&output, None);
            }
        }
    }

    Ok(())
}

/// Unwrap a run's result for printing.
///
/// An upload rejection is a soft failure: the status line and raw body go
/// to `out` and `Ok(None)` ends the run with exit code 0. Every other error
/// is returned.
fn take_output(
    result: Result<ExtractionOutput, CoverMetaError>,
    out: &mut impl Write,
) -> Result<Option<ExtractionOutput>> {
    match result {
        Ok(output) => Ok(Some(output)),
        Err(CoverMetaError::UploadRejected { status, body }) => {
            writeln!(out, "Error: {status}")?;
            writeln!(out, "{body}")?;
            Ok(None)
        }
        Err(e) => Err(e).context("Extraction failed"),
    }
}

/// Map CLI args to `ExtractionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let api_key = cli
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .context("No API key: set GEMINI_API_KEY or pass --api-key")?;

    let mut builder = ExtractionConfig::builder()
        .api_key(api_key)
        .base_url(cli.base_url.clone())
        .model(cli.model.clone())
        .settle_delay_ms(cli.settle_delay_ms)
        .response_schema(cli.schema)
        .file_name_fallback(cli.fallback_to_filename);

    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(ref path) = cli.prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.cover_prompt(prompt.trim().to_string());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// One-line summary on stderr, so stdout stays pure JSON.
fn print_summary(output: &ExtractionOutput, written_to: Option<&Path>) {
    let source = match output.source {
        MetadataSource::Cover => "cover",
        MetadataSource::FileName => "file name",
    };
    let target = written_to
        .map(|p| format!("  →  {}", bold(&p.display().to_string())))
        .unwrap_or_default();
    eprintln!(
        "{}  {}/6 fields from {}  {}{}",
        green("✔"),
        output.metadata.filled_count(),
        source,
        dim(&format!("{}ms", output.stats.total_duration_ms)),
        target,
    );
}
