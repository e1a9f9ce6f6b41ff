//! Error types for the doc2table library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Doc2TableError`] — **Fatal**: the extraction cannot proceed or produce
//!   any output at all (unsupported input format, missing converter, model
//!   process exited non-zero, nothing to materialise). Returned as
//!   `Err(Doc2TableError)` from the top-level `extract*` functions.
//!
//! * [`ChunkError`] — **Non-fatal**: a single chunk's model reply yielded no
//!   recoverable JSON. Stored inside [`crate::output::ChunkOutcome`] so
//!   callers can inspect which chunks contributed nothing rather than losing
//!   the whole document to one noisy reply.
//!
//! A failed model *invocation* is fatal; a failed model *reply parse* is not.
//! The invocation failing means the external process is broken and every
//! remaining chunk would fail the same way, while an unparseable reply is a
//! per-chunk property of free-form model output.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doc2table library.
///
/// Per-chunk JSON recovery misses use [`ChunkError`] and are stored in
/// [`crate::output::ChunkOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Doc2TableError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Input extension is not one of .pdf, .docx, .doc.
    #[error("Unsupported file extension '{extension}' for '{path}'\nSupported formats: .pdf, .docx, .doc")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// A required external program (e.g. the .doc → .docx converter) is absent.
    #[error("Required program '{program}' not found on PATH.\n{hint}")]
    MissingDependency { program: String, hint: String },

    /// The document exists but its content could not be read.
    #[error("Failed to read document '{path}': {detail}")]
    DocumentParse { path: PathBuf, detail: String },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The external model process exited non-zero. Fatal for the whole run.
    #[error("Model command failed: {stderr}\nCommand: {command}")]
    ModelInvocation { command: String, stderr: String },

    // ── Materialisation errors ────────────────────────────────────────────
    /// No records were recovered, so there is nothing to persist.
    #[error("No records to materialise: every chunk's reply was empty or unparseable")]
    EmptyRecordSet,

    /// A recovered record cannot be laid out as a table row or column.
    #[error("Record {index} is not tabular: {detail}")]
    NotTabular { index: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output table file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single chunk.
///
/// Stored alongside [`crate::output::ChunkOutcome`] when a chunk's model
/// reply yields no recoverable JSON. The run continues with remaining chunks.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ChunkError {
    /// None of the recovery strategies found a JSON value in the reply.
    #[error("Chunk {chunk}: no JSON value recovered from {reply_len}-byte model reply")]
    NoJsonRecovered { chunk: usize, reply_len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display() {
        let e = Doc2TableError::UnsupportedFormat {
            path: PathBuf::from("notes.txt"),
            extension: ".txt".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains(".txt"), "got: {msg}");
        assert!(msg.contains(".docx"));
    }

    #[test]
    fn model_invocation_carries_stderr_and_command() {
        let e = Doc2TableError::ModelInvocation {
            command: "ollama run llama2 --prompt-file /tmp/p".into(),
            stderr: "model not found".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("model not found"));
        assert!(msg.contains("ollama run"));
    }

    #[test]
    fn not_tabular_display() {
        let e = Doc2TableError::NotTabular {
            index: 3,
            detail: "expected a JSON object, got a string".into(),
        };
        assert!(e.to_string().contains("Record 3"));
    }

    #[test]
    fn chunk_error_display() {
        let e = ChunkError::NoJsonRecovered {
            chunk: 2,
            reply_len: 512,
        };
        let msg = e.to_string();
        assert!(msg.contains("Chunk 2"));
        assert!(msg.contains("512"));
    }
}
