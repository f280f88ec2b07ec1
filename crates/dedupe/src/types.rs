//! Result types for the deduplication stage.

use serde::{Deserialize, Serialize};
use textseg::{truncate_with_ellipsis, Chunk};

/// Maximum preview length (bytes) carried in a drop record.
pub(crate) const PREVIEW_BYTES: usize = 200;

/// Why a chunk was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    ExactDuplicate,
    NearDuplicate,
}

/// Forensic record for a removed chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedChunk {
    /// Id of the removed chunk.
    pub chunk_id: String,
    pub reason: DropReason,
    /// Id of the earlier kept chunk that caused the drop.
    pub matched_chunk_id: String,
    /// Hamming distance for near-duplicates; 0 for exact duplicates.
    pub distance: u32,
    /// Truncated preview of the original text.
    pub preview: String,
}

impl DroppedChunk {
    pub(crate) fn new(
        chunk: &Chunk,
        reason: DropReason,
        matched_chunk_id: &str,
        distance: u32,
    ) -> Self {
        Self {
            chunk_id: chunk.id.clone(),
            reason,
            matched_chunk_id: matched_chunk_id.to_string(),
            distance,
            preview: truncate_with_ellipsis(&chunk.text, PREVIEW_BYTES),
        }
    }
}

/// Deduplication statistics.
///
/// Invariants: `kept_count + dropped_count == input_count` and
/// `exact_dups + near_dups == dropped_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupeStats {
    pub input_count: usize,
    pub kept_count: usize,
    pub dropped_count: usize,
    pub exact_dups: usize,
    pub near_dups: usize,
}

/// Output of the deduplication stage: surviving chunks in input order plus a
/// drop record for every removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupeResult {
    pub kept: Vec<Chunk>,
    pub dropped: Vec<DroppedChunk>,
    pub stats: DedupeStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_reason_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DropReason::ExactDuplicate).unwrap(),
            "\"exact_duplicate\""
        );
        assert_eq!(
            serde_json::to_string(&DropReason::NearDuplicate).unwrap(),
            "\"near_duplicate\""
        );
    }

    #[test]
    fn dropped_chunk_preview_truncates() {
        let chunk = Chunk {
            id: "c0001".into(),
            text: "x".repeat(300),
            norm: "x".repeat(300),
            index: 0,
        };
        let dropped = DroppedChunk::new(&chunk, DropReason::ExactDuplicate, "c0001", 0);
        assert_eq!(dropped.preview.len(), 203);
        assert!(dropped.preview.ends_with("..."));
    }

    #[test]
    fn dropped_chunk_short_preview_unmodified() {
        let chunk = Chunk {
            id: "c0002".into(),
            text: "short text".into(),
            norm: "short text".into(),
            index: 1,
        };
        let dropped = DroppedChunk::new(&chunk, DropReason::NearDuplicate, "c0001", 3);
        assert_eq!(dropped.preview, "short text");
        assert_eq!(dropped.distance, 3);
        assert_eq!(dropped.matched_chunk_id, "c0001");
    }
}
