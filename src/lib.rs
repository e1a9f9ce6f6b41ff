//! # doc2table
//!
//! Extract structured, tabular data from documents with local LLMs.
//!
//! Give it a PDF, DOCX, or legacy DOC file and a plain-English instruction
//! ("extract every invoice line item with date, description, and amount"),
//! and it returns an ordered record set ready to land in CSV or XLSX.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌──────────┐   ┌─────────┐   ┌───────────┐
//! │ Document │ → │  Text   │ → │  Chunks  │ → │  Model  │ → │  Records  │
//! │ pdf/docx │   │ extract │   │ overlap  │   │ invoke  │   │ aggregate │
//! └──────────┘   └─────────┘   └──────────┘   └─────────┘   └───────────┘
//!                                                                 │
//!                                              ┌──────────┐       ▼
//!                                              │ CSV/XLSX │ ← materialise
//!                                              └──────────┘
//! ```
//!
//! Chunks are processed strictly one at a time, in document order. Model
//! replies are free-form text, so each reply goes through a prioritized chain
//! of JSON recovery strategies; a chunk that yields nothing recoverable is
//! recorded as a miss and the run continues.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use doc2table::{extract_to_file, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), doc2table::Doc2TableError> {
//!     let config = ExtractionConfig::builder()
//!         .model("mistral")
//!         .build()?;
//!
//!     let stats = extract_to_file(
//!         "report.pdf",
//!         "Extract all employees with name, role, and start date",
//!         "employees.csv",
//!         &config,
//!     )
//!     .await?;
//!
//!     println!("{} records from {} chunks", stats.total_records, stats.total_chunks);
//!     Ok(())
//! }
//! ```
//!
//! ## Requirements
//!
//! * A local model runner on `PATH` (ollama by default; override the command
//!   with `OLLAMA_CMD` or [`ExtractionConfig::command_template`]).
//! * LibreOffice (`soffice`) on `PATH`, only for legacy `.doc` inputs.

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod table;

pub use config::{
    ExtractionConfig, ExtractionConfigBuilder, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
    DEFAULT_MODEL,
};
pub use error::{ChunkError, Doc2TableError};
pub use extract::{extract, extract_from_text, extract_sync, extract_to_file};
pub use output::{ChunkOutcome, ExtractionOutput, ExtractionStats};
pub use pipeline::invoke::{ModelInvoker, ShellInvoker, DEFAULT_COMMAND_TEMPLATE};
pub use pipeline::recover::RecoveryStrategy;
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use table::{materialize, persist, Table, TableShape};
