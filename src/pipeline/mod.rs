//! Pipeline stages for document-to-table extraction.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. fake the model invoker in tests) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ chunk ──▶ invoke ──▶ recover ──▶ aggregate
//! (pdf/docx)  (windows)  (local LLM)  (JSON)     (records)
//! ```
//!
//! 1. [`input`]     — extract one text blob from a PDF/DOCX/DOC file; runs in
//!    `spawn_blocking` because the format readers are synchronous
//! 2. [`chunk`]     — split the blob into overlapping windows so oversized
//!    documents fit the model's context
//! 3. [`invoke`]    — hand each chunk's payload to the external model process;
//!    the only stage that leaves this process
//! 4. [`recover`]   — salvage a JSON value from the model's free-form reply
//! 5. [`aggregate`] — merge recovered values across chunks into one ordered
//!    record set
//!
//! Chunks flow through stages 3–5 strictly one at a time, in order. The
//! record set is then handed to [`crate::table`] for materialisation.

pub mod aggregate;
pub mod chunk;
pub mod input;
pub mod invoke;
pub mod recover;
