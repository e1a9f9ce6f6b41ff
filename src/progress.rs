//! Progress-callback trait for per-chunk extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline works through the chunk sequence.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a log, or a job tracker without
//! the library knowing anything about how the host application communicates.
//! Chunks are processed strictly sequentially, so implementations never see
//! concurrent calls, but the trait is still `Send + Sync` so callbacks can be
//! moved into spawned tasks.

use std::sync::Arc;

/// Called by the extraction pipeline as it processes each chunk.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Chunk numbers are 1-indexed for display.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once after chunking, before any model invocation.
    fn on_extraction_start(&self, total_chunks: usize) {
        let _ = total_chunks;
    }

    /// Called just before a chunk's payload is sent to the model.
    fn on_chunk_start(&self, chunk_num: usize, total_chunks: usize) {
        let _ = (chunk_num, total_chunks);
    }

    /// Called when a chunk's reply yielded a JSON value.
    ///
    /// `records` is the number of records the chunk contributed (may be 0
    /// for a reply that parsed but carried no tabular payload).
    fn on_chunk_complete(&self, chunk_num: usize, total_chunks: usize, records: usize) {
        let _ = (chunk_num, total_chunks, records);
    }

    /// Called when a chunk's reply yielded nothing recoverable.
    fn on_chunk_miss(&self, chunk_num: usize, total_chunks: usize, detail: String) {
        let _ = (chunk_num, total_chunks, detail);
    }

    /// Called once after every chunk has been attempted.
    fn on_extraction_complete(&self, total_chunks: usize, parsed_chunks: usize) {
        let _ = (total_chunks, parsed_chunks);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
