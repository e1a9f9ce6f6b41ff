//! CLI binary for doc2table.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use doc2table::{
    extract, materialize, persist, ExtractionConfig, ExtractionProgressCallback, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-chunk log
/// lines using [indicatif]. Chunks run strictly sequentially, so lines always
/// appear in document order.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Per-chunk wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
    /// Count of chunks whose reply yielded no JSON.
    misses: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically
    /// by `on_extraction_start` (called before any chunks are processed).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_extraction_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            misses: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} chunks  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_chunks: usize) {
        self.activate_bar(total_chunks);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Querying model over {total_chunks} chunks…"))
        ));
    }

    fn on_chunk_start(&self, chunk_num: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap()
            .insert(chunk_num, Instant::now());
        self.bar.set_message(format!("chunk {chunk_num}"));
    }

    fn on_chunk_complete(&self, chunk_num: usize, total: usize, records: usize) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&chunk_num)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            chunk_num,
            total,
            dim(&format!("{records:>3} records")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_chunk_miss(&self, chunk_num: usize, total: usize, detail: String) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&chunk_num)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.misses.fetch_add(1, Ordering::SeqCst);

        // Truncate very long messages to keep output tidy.
        let msg = if detail.len() > 80 {
            format!("{}\u{2026}", &detail[..79])
        } else {
            detail
        };

        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {}  {}",
            yellow("⚠"),
            chunk_num,
            total,
            yellow(&msg),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, total_chunks: usize, parsed_chunks: usize) {
        let missed = total_chunks.saturating_sub(parsed_chunks);
        self.bar.finish_and_clear();

        if missed == 0 {
            eprintln!(
                "{} {} chunks parsed successfully",
                green("✔"),
                bold(&parsed_chunks.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} chunks parsed  ({} yielded no JSON)",
                cyan("⚠"),
                bold(&parsed_chunks.to_string()),
                total_chunks,
                yellow(&missed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract a table from a PDF (writes output.csv)
  doc2table report.pdf --prompt "Extract all employees with name, role, salary"

  # Pick the model and output file
  doc2table report.docx --model mistral --prompt "List every invoice line item" \
      --out invoices.xlsx

  # Legacy .doc input (requires LibreOffice's soffice on PATH)
  doc2table legacy.doc --prompt "Extract the budget table" --out budget.csv

  # Smaller chunks for a small-context model
  doc2table big.pdf --prompt "..." --chunk-size 3000 --chunk-overlap 200

  # Keep the exact payload sent to the model, for prompt debugging
  doc2table report.pdf --prompt "..." --temp-prompt /tmp/payload.txt

  # Use a different model runner entirely
  doc2table report.pdf --prompt "..." \
      --command 'llm -m {model} < {prompt_file}'

  # Machine-readable run report (records + per-chunk outcomes) on stdout
  doc2table report.pdf --prompt "..." --json > run.json

OUTPUT FORMAT:
  Decided by the --out extension: .xlsx/.xls → spreadsheet, anything
  else → CSV. Columns are the union of record keys in first-seen order.

ENVIRONMENT VARIABLES:
  OLLAMA_CMD   Command template with {model} and {prompt_file} placeholders.
               Default: ollama run {model} --prompt-file {prompt_file}

SETUP:
  1. Install a model runner:   ollama pull llama2
  2. Extract:                  doc2table document.pdf --prompt "..."
"#;

/// Extract structured tables from documents using local LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "doc2table",
    version,
    about = "Extract structured tables from PDF/DOCX/DOC documents using local LLMs",
    long_about = "Extract structured, tabular data from documents using a locally installed \
model runner (ollama by default). The document text is split into overlapping chunks, each \
chunk is sent to the model with your instruction, and the JSON replies are aggregated into \
a CSV or XLSX table.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input document: .pdf, .docx, or .doc.
    input: PathBuf,

    /// What to extract, in plain English.
    #[arg(short, long, env = "DOC2TABLE_PROMPT")]
    prompt: String,

    /// Local model identifier passed to the command template.
    #[arg(short, long, env = "DOC2TABLE_MODEL", default_value = "llama2")]
    model: String,

    /// Destination table file (.csv, .xlsx, .xls).
    #[arg(short, long, env = "DOC2TABLE_OUT", default_value = "output.csv")]
    out: PathBuf,

    /// Chunk window size in characters.
    #[arg(long, env = "DOC2TABLE_CHUNK_SIZE", default_value_t = 8000)]
    chunk_size: usize,

    /// Overlap between consecutive chunks in characters.
    #[arg(long, env = "DOC2TABLE_CHUNK_OVERLAP", default_value_t = 500)]
    chunk_overlap: usize,

    /// Write each chunk's exact model payload to this file and keep it.
    #[arg(long, env = "DOC2TABLE_TEMP_PROMPT")]
    temp_prompt: Option<PathBuf>,

    /// Command template with {model} and {prompt_file} placeholders.
    #[arg(long, env = "OLLAMA_CMD")]
    command: Option<String>,

    /// Print the full run report (records, per-chunk outcomes, stats) as
    /// JSON on stdout instead of writing the table file.
    #[arg(long, env = "DOC2TABLE_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "DOC2TABLE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2TABLE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2TABLE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let mut builder = ExtractionConfig::builder()
        .model(&cli.model)
        .chunk_size(cli.chunk_size)
        .chunk_overlap(cli.chunk_overlap);

    if let Some(ref template) = cli.command {
        builder = builder.command_template(template.clone());
    }
    if let Some(ref path) = cli.temp_prompt {
        builder = builder.temp_prompt(path.clone());
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run extraction ───────────────────────────────────────────────────
    let output = extract(&cli.input, &cli.prompt, &config)
        .await
        .context("Extraction failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    // An all-miss run is a prompt/model problem, not a crash: warn and exit
    // cleanly so shell pipelines can distinguish it from hard failures.
    if output.records.is_empty() {
        eprintln!(
            "{} Warning: No valid JSON parsed from model output. Check the prompt and model.",
            yellow("⚠")
        );
        return Ok(());
    }

    let table = materialize(&output.records).context("Records do not form a table")?;
    persist(&table, &cli.out).context("Failed to write output file")?;

    if !cli.quiet {
        eprintln!(
            "{}  {} records  {}ms  →  {}",
            if output.stats.missed_chunks == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            bold(&output.stats.total_records.to_string()),
            output.stats.total_duration_ms,
            bold(&cli.out.display().to_string()),
        );
        if output.stats.missed_chunks > 0 {
            eprintln!(
                "   {} of {} chunks yielded no JSON {}",
                yellow(&output.stats.missed_chunks.to_string()),
                output.stats.total_chunks,
                dim(&format!("(chunks {:?})", output.missed_chunk_indices())),
            );
        }
    }

    Ok(())
}
