//! Prompt construction for structured-data extraction.
//!
//! Centralising the framing text here serves two purposes:
//!
//! 1. **Single source of truth** — tightening the JSON instructions requires
//!    editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the assembled payload directly
//!    without invoking a real model.
//!
//! [`build_prompt`] is a pure function: the same instruction and chunk text
//! always produce the same payload, byte for byte.

/// Fixed framing prepended to every per-chunk payload.
///
/// Asks the model for a strict JSON array of objects so the reply can be
/// loaded into a spreadsheet; the user's instruction decides which fields
/// to extract.
pub const SYSTEM_FRAMING: &str = "You are a tool that extracts structured data from the provided document.\n\
Return the result in strict JSON format, suitable for loading into a spreadsheet (a list of objects).\n\
Document follows below. Use the user's prompt to decide what fields to extract.\n\n";

/// Assemble the full payload for one chunk.
///
/// Layout, in order and clearly delimited: the fixed [`SYSTEM_FRAMING`], the
/// user instruction verbatim, then the chunk text verbatim. No truncation and
/// no escaping — the payload travels to the model through a file, not a shell
/// argument.
pub fn build_prompt(instruction: &str, chunk_text: &str) -> String {
    format!(
        "{SYSTEM_FRAMING}USER INSTRUCTIONS:\n{instruction}\n\nDOCUMENT TEXT:\n{chunk_text}"
    )
}
