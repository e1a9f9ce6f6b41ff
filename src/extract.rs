//! Top-level extraction entry points.
//!
//! ## Control flow
//!
//! ```text
//! read document → chunk → per chunk { prompt → invoke → recover } → aggregate
//! ```
//!
//! Chunks are processed strictly one at a time, in order. A chunk whose reply
//! yields no recoverable JSON is recorded as a miss and the loop proceeds; a
//! failed model *invocation* aborts the whole run, because the external
//! process being broken would fail every remaining chunk identically.
//!
//! The per-chunk payload travels to the model through a file. When
//! `temp_prompt` is configured that file is user-named, rewritten for every
//! chunk, and left in place for debugging; otherwise each chunk gets a
//! [`tempfile::NamedTempFile`] whose drop removes it on every exit path,
//! including an invocation error propagating out of the loop.

use crate::config::ExtractionConfig;
use crate::error::{ChunkError, Doc2TableError};
use crate::output::{ChunkOutcome, ExtractionOutput, ExtractionStats};
use crate::pipeline::invoke::{ModelInvoker, ShellInvoker};
use crate::pipeline::{aggregate, chunk, input, recover};
use crate::prompts::build_prompt;
use crate::table;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract structured records from a document file.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input`       — path to a `.pdf`, `.docx`, or `.doc` file
/// * `instruction` — the user's description of what to extract
/// * `config`      — extraction configuration
///
/// # Returns
/// `Ok(ExtractionOutput)` even when some or all chunks missed (check
/// `output.stats.missed_chunks`). An empty record set is not an error here;
/// it only becomes fatal when materialised into a table.
///
/// # Errors
/// Returns `Err(Doc2TableError)` only for fatal errors: unreadable or
/// unsupported input, a missing external converter, an invalid chunk
/// geometry, or the model process exiting non-zero.
pub async fn extract(
    input: impl AsRef<Path>,
    instruction: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Doc2TableError> {
    let total_start = Instant::now();
    let path = input.as_ref().to_path_buf();
    info!("Starting extraction: {}", path.display());

    // The format readers are synchronous (file parsing, possibly a soffice
    // subprocess), so keep them off the async executor's hot path.
    let read_start = Instant::now();
    let text = tokio::task::spawn_blocking(move || input::extract_text(&path))
        .await
        .map_err(|e| Doc2TableError::Internal(format!("document reader task failed: {e}")))??;
    let read_duration_ms = read_start.elapsed().as_millis() as u64;
    info!("Read {} chars in {}ms", text.len(), read_duration_ms);

    run_pipeline(&text, instruction, config, read_duration_ms, total_start).await
}

/// Extract structured records from already-extracted text.
///
/// Skips the document readers entirely: use this when the text comes from a
/// database, a network stream, or a format this crate does not read. It is
/// also the seam end-to-end tests use together with a scripted
/// [`ModelInvoker`].
pub async fn extract_from_text(
    text: &str,
    instruction: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Doc2TableError> {
    run_pipeline(text, instruction, config, 0, Instant::now()).await
}

/// Extract from a document and persist the materialised table to `out_path`.
///
/// Format is decided by the destination extension (`.xlsx`/`.xls` →
/// spreadsheet, anything else → CSV). Fails with
/// [`Doc2TableError::EmptyRecordSet`] when no records were recovered —
/// callers that prefer a warning over an error (like the CLI) should call
/// [`extract`] and materialise themselves.
pub async fn extract_to_file(
    input: impl AsRef<Path>,
    instruction: &str,
    out_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, Doc2TableError> {
    let output = extract(input, instruction, config).await?;
    let materialized = table::materialize(&output.records)?;
    table::persist(&materialized, out_path.as_ref())?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input: impl AsRef<Path>,
    instruction: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Doc2TableError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Doc2TableError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(extract(input, instruction, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the model invoker, from most-specific to least-specific:
///
/// 1. **Pre-built invoker** (`config.invoker`) — the caller constructed it
///    entirely; used as-is. This is how tests inject scripted replies.
/// 2. **Configured template** (`config.command_template`) — an explicit
///    command template from the caller or a CLI flag.
/// 3. **Environment** — the `OLLAMA_CMD` variable, falling back to the
///    built-in `ollama run {model} --prompt-file {prompt_file}` default.
fn resolve_invoker(config: &ExtractionConfig) -> Arc<dyn ModelInvoker> {
    if let Some(ref invoker) = config.invoker {
        return Arc::clone(invoker);
    }
    if let Some(ref template) = config.command_template {
        return Arc::new(ShellInvoker::new(template.clone()));
    }
    Arc::new(ShellInvoker::from_env())
}

/// The sequential chunk loop shared by [`extract`] and [`extract_from_text`].
async fn run_pipeline(
    text: &str,
    instruction: &str,
    config: &ExtractionConfig,
    read_duration_ms: u64,
    total_start: Instant,
) -> Result<ExtractionOutput, Doc2TableError> {
    let chunks = chunk::chunk_text(text, config.chunk_size, config.chunk_overlap)?;
    let total_chunks = chunks.len();
    debug!(
        "Split into {} chunks (size {}, overlap {})",
        total_chunks, config.chunk_size, config.chunk_overlap
    );

    let invoker = resolve_invoker(config);

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(total_chunks);
    }

    let mut records = Vec::new();
    let mut outcomes: Vec<ChunkOutcome> = Vec::with_capacity(total_chunks);
    let mut invoke_duration_ms = 0u64;

    for chunk in &chunks {
        let chunk_num = chunk.index + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_chunk_start(chunk_num, total_chunks);
        }
        let chunk_start = Instant::now();

        let payload = build_prompt(instruction, &chunk.text);

        // `_guard` owns the fresh temp file for this chunk; dropping it at
        // the end of the iteration (or on `?`) removes the file. A
        // user-supplied temp_prompt path is reused and left in place.
        let (prompt_path, _guard) = write_payload(&payload, config.temp_prompt.as_deref())?;

        let invoke_start = Instant::now();
        let reply = invoker.invoke(&config.model, &prompt_path).await?;
        invoke_duration_ms += invoke_start.elapsed().as_millis() as u64;

        let outcome = match recover::recover(&reply) {
            Some((value, strategy)) => {
                let contributed = aggregate::append_records(&mut records, value);
                debug!(
                    "Chunk {}/{}: {} records via {:?}",
                    chunk_num, total_chunks, contributed, strategy
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_chunk_complete(chunk_num, total_chunks, contributed);
                }
                ChunkOutcome {
                    chunk_index: chunk.index,
                    strategy: Some(strategy),
                    records_contributed: contributed,
                    duration_ms: chunk_start.elapsed().as_millis() as u64,
                    error: None,
                }
            }
            None => {
                let error = ChunkError::NoJsonRecovered {
                    chunk: chunk.index,
                    reply_len: reply.len(),
                };
                warn!("Chunk {}/{}: {}", chunk_num, total_chunks, error);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_chunk_miss(chunk_num, total_chunks, error.to_string());
                }
                ChunkOutcome {
                    chunk_index: chunk.index,
                    strategy: None,
                    records_contributed: 0,
                    duration_ms: chunk_start.elapsed().as_millis() as u64,
                    error: Some(error),
                }
            }
        };
        outcomes.push(outcome);
    }

    let parsed_chunks = outcomes.iter().filter(|o| o.error.is_none()).count();
    let missed_chunks = total_chunks - parsed_chunks;

    let stats = ExtractionStats {
        total_chunks,
        parsed_chunks,
        missed_chunks,
        total_records: records.len(),
        read_duration_ms,
        invoke_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(total_chunks, parsed_chunks);
    }

    info!(
        "Extraction complete: {} records from {}/{} chunks in {}ms",
        stats.total_records, parsed_chunks, total_chunks, stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        records,
        chunks: outcomes,
        stats,
    })
}

/// Write the payload where the model invoker can read it.
///
/// Returns the path and, for the fresh-tempfile case, the guard whose drop
/// deletes the file.
fn write_payload(
    payload: &str,
    temp_prompt: Option<&Path>,
) -> Result<(PathBuf, Option<tempfile::NamedTempFile>), Doc2TableError> {
    match temp_prompt {
        Some(path) => {
            std::fs::write(path, payload).map_err(|e| Doc2TableError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok((path.to_path_buf(), None))
        }
        None => {
            let mut tmp = tempfile::NamedTempFile::new()
                .map_err(|e| Doc2TableError::Internal(format!("tempfile: {e}")))?;
            tmp.write_all(payload.as_bytes())
                .map_err(|e| Doc2TableError::Internal(format!("tempfile write: {e}")))?;
            let path = tmp.path().to_path_buf();
            Ok((path, Some(tmp)))
        }
    }
}
