//! Output types for an extraction run.
//!
//! [`ExtractionOutput`] carries the aggregated record set plus a per-chunk
//! report, so callers can see not only *what* was extracted but *which*
//! chunks contributed, which recovery strategy salvaged each reply, and which
//! chunks were misses. Everything serialises to JSON for machine consumers.

use crate::error::ChunkError;
use crate::pipeline::recover::RecoveryStrategy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What happened to one chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkOutcome {
    /// 0-indexed chunk position.
    pub chunk_index: usize,
    /// Which recovery strategy produced the chunk's JSON, or `None` on a miss.
    pub strategy: Option<RecoveryStrategy>,
    /// Records this chunk added to the record set. A reply can parse cleanly
    /// and still contribute zero records (e.g. a bare scalar).
    pub records_contributed: usize,
    /// Wall-clock time spent on this chunk, including the model invocation.
    pub duration_ms: u64,
    /// The recovery miss, when there was one.
    pub error: Option<ChunkError>,
}

/// Aggregate statistics for the whole run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Chunks the document was split into (always ≥ 1).
    pub total_chunks: usize,
    /// Chunks whose reply yielded a JSON value.
    pub parsed_chunks: usize,
    /// Chunks whose reply yielded nothing recoverable.
    pub missed_chunks: usize,
    /// Records in the final record set.
    pub total_records: usize,
    /// Time spent reading and chunking the document.
    pub read_duration_ms: u64,
    /// Time spent inside model invocations, summed across chunks.
    pub invoke_duration_ms: u64,
    /// End-to-end wall-clock time.
    pub total_duration_ms: u64,
}

/// The result of one extraction run.
///
/// Returned by [`crate::extract`] even when some (or all) chunks missed —
/// an empty record set only becomes fatal at materialisation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Aggregated record set, in chunk order then within-chunk array order.
    pub records: Vec<Value>,
    /// Per-chunk outcomes, in chunk order.
    pub chunks: Vec<ChunkOutcome>,
    /// Run statistics.
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    /// Indices of chunks that yielded no recoverable JSON.
    ///
    /// Surfaced explicitly so summaries can name the failed chunks instead of
    /// silently dropping them.
    pub fn missed_chunk_indices(&self) -> Vec<usize> {
        self.chunks
            .iter()
            .filter(|c| c.error.is_some())
            .map(|c| c.chunk_index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_output() -> ExtractionOutput {
        ExtractionOutput {
            records: vec![json!({"a": 1})],
            chunks: vec![
                ChunkOutcome {
                    chunk_index: 0,
                    strategy: Some(RecoveryStrategy::BraceSlice),
                    records_contributed: 1,
                    duration_ms: 12,
                    error: None,
                },
                ChunkOutcome {
                    chunk_index: 1,
                    strategy: None,
                    records_contributed: 0,
                    duration_ms: 9,
                    error: Some(ChunkError::NoJsonRecovered {
                        chunk: 1,
                        reply_len: 40,
                    }),
                },
            ],
            stats: ExtractionStats {
                total_chunks: 2,
                parsed_chunks: 1,
                missed_chunks: 1,
                total_records: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn missed_chunk_indices_lists_only_misses() {
        assert_eq!(sample_output().missed_chunk_indices(), vec![1]);
    }

    #[test]
    fn output_serialises_and_deserialises() {
        let output = sample_output();
        let json = serde_json::to_string_pretty(&output).unwrap();
        let back: ExtractionOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.stats.total_chunks, 2);
        assert_eq!(back.records, output.records);
        assert_eq!(back.missed_chunk_indices(), vec![1]);
    }
}
