//! Pagesift deduplication layer.
//!
//! Given the chunk sequence produced by `textseg`, this crate removes exact
//! duplicates (content digests of normalized text) and near-duplicates
//! (64-bit SimHash over character k-grams, compared within a sliding
//! window), and reports every drop decision.
//!
//! ```text
//! chunks ──▶ exact-hash dedupe ──▶ simhash dedupe ──▶ DedupeResult
//! ```
//!
//! # Determinism
//!
//! Deduplication is a pure function of `(chunks, config)`: no I/O, no
//! randomness, no clock. Identical input chunks and configuration always
//! produce an identical [`DedupeResult`].
//!
//! # Quick start
//!
//! ```
//! use dedupe::{dedupe, DedupeConfig, Method};
//! use textseg::chunk_text;
//!
//! let text = "a paragraph repeated verbatim\n\nsomething else entirely here\n\na paragraph repeated verbatim";
//! let chunks = chunk_text(text, 5);
//!
//! let result = dedupe(chunks, &DedupeConfig::default().with_method(Method::Exact));
//! assert_eq!(result.stats.kept_count, 2);
//! assert_eq!(result.stats.exact_dups, 1);
//! ```

mod config;
mod exact;
mod near;
mod simhash;
mod types;

use std::collections::{HashMap, HashSet};

use textseg::Chunk;
use tracing::debug;

pub use crate::config::{DedupeConfig, Method};
pub use crate::exact::exact_dedupe;
pub use crate::near::simhash_dedupe;
pub use crate::simhash::{hamming, simhash64};
pub use crate::types::{DedupeResult, DedupeStats, DropReason, DroppedChunk};

/// Run deduplication over `chunks` according to `cfg.method`.
///
/// - [`Method::Exact`] runs the exact-hash pass only.
/// - [`Method::Simhash`] runs the exact-hash pass, then SimHash on its
///   survivors; drop records list exact drops first, then near drops.
/// - [`Method::Both`] runs both passes independently on the original input
///   and keeps a chunk only if both kept it. Drop records are merged per
///   chunk id (the smaller distance wins on collision) and emitted in
///   chunker order.
///
/// The configuration is re-validated here, so out-of-range values degrade
/// to defaults rather than misbehaving.
pub fn dedupe(chunks: Vec<Chunk>, cfg: &DedupeConfig) -> DedupeResult {
    let cfg = cfg.validated();

    let input_count = chunks.len();
    let (kept, dropped) = match cfg.method {
        Method::Exact => exact_dedupe(&chunks),
        Method::Simhash => {
            let (exact_kept, exact_dropped) = exact_dedupe(&chunks);
            let (kept, near_dropped) = simhash_dedupe(&exact_kept, &cfg);
            let mut dropped = exact_dropped;
            dropped.extend(near_dropped);
            (kept, dropped)
        }
        Method::Both => both_dedupe(&chunks, &cfg),
    };

    let exact_dups = dropped
        .iter()
        .filter(|d| d.reason == DropReason::ExactDuplicate)
        .count();
    let near_dups = dropped.len() - exact_dups;

    debug!(
        input = input_count,
        kept = kept.len(),
        exact = exact_dups,
        near = near_dups,
        method = %cfg.method,
        "deduplication finished"
    );

    DedupeResult {
        stats: DedupeStats {
            input_count,
            kept_count: kept.len(),
            dropped_count: dropped.len(),
            exact_dups,
            near_dups,
        },
        kept,
        dropped,
    }
}

/// Independent exact and SimHash passes; keep only chunks both passes kept.
fn both_dedupe(chunks: &[Chunk], cfg: &DedupeConfig) -> (Vec<Chunk>, Vec<DroppedChunk>) {
    let (exact_kept, exact_dropped) = exact_dedupe(chunks);
    let (simhash_kept, simhash_dropped) = simhash_dedupe(chunks, cfg);

    let exact_ids: HashSet<&str> = exact_kept.iter().map(|c| c.id.as_str()).collect();
    let simhash_ids: HashSet<&str> = simhash_kept.iter().map(|c| c.id.as_str()).collect();

    let kept: Vec<Chunk> = chunks
        .iter()
        .filter(|c| exact_ids.contains(c.id.as_str()) && simhash_ids.contains(c.id.as_str()))
        .cloned()
        .collect();

    // Merge drop records per chunk id; on collision the smaller distance
    // wins, which makes exact records beat near records for the same chunk.
    let mut by_id: HashMap<String, DroppedChunk> = HashMap::new();
    for record in exact_dropped.into_iter().chain(simhash_dropped) {
        match by_id.get(&record.chunk_id) {
            Some(existing) if existing.distance <= record.distance => {}
            _ => {
                by_id.insert(record.chunk_id.clone(), record);
            }
        }
    }

    let mut dropped: Vec<DroppedChunk> = by_id.into_values().collect();
    dropped.sort_by(|a, b| a.chunk_id.cmp(&b.chunk_id));

    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use textseg::chunk_text;

    fn chunks_from(texts: &[&str]) -> Vec<Chunk> {
        chunk_text(&texts.join("\n\n"), 1)
    }

    #[test]
    fn exact_method_basic_scenario() {
        // [A, B, A, C] under exact: kept [A, B, C], one drop record.
        let chunks = chunks_from(&[
            "paragraph alpha content",
            "paragraph beta content",
            "paragraph alpha content",
            "paragraph gamma content",
        ]);
        let result = dedupe(chunks, &DedupeConfig::new().with_method(Method::Exact));

        let kept_ids: Vec<&str> = result.kept.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(kept_ids, ["c0001", "c0002", "c0004"]);

        assert_eq!(result.dropped.len(), 1);
        assert_eq!(result.dropped[0].chunk_id, "c0003");
        assert_eq!(result.dropped[0].reason, DropReason::ExactDuplicate);
        assert_eq!(result.dropped[0].matched_chunk_id, "c0001");
        assert_eq!(result.dropped[0].distance, 0);
    }

    #[test]
    fn simhash_method_exact_prepass_handles_identical_norms() {
        // Two chunks with identical norms: the exact pre-pass drops the
        // second, the simhash pass sees a single survivor.
        let chunks = chunks_from(&["identical paragraph text", "identical paragraph text"]);
        let result = dedupe(chunks, &DedupeConfig::default());

        assert_eq!(result.stats.kept_count, 1);
        assert_eq!(result.stats.exact_dups, 1);
        assert_eq!(result.stats.near_dups, 0);
    }

    #[test]
    fn simhash_method_orders_exact_drops_before_near_drops() {
        let chunks = chunks_from(&[
            "the quarterly report shows revenue increased by fifteen percent this year",
            "the quarterly report shows revenue increased by fifteen percent this year",
            "the quarterly report shows revenue increased by sixteen percent this year",
        ]);
        let result = dedupe(chunks, &DedupeConfig::default());

        assert_eq!(result.stats.kept_count, 1);
        assert_eq!(result.dropped.len(), 2);
        assert_eq!(result.dropped[0].reason, DropReason::ExactDuplicate);
        assert_eq!(result.dropped[0].chunk_id, "c0002");
        assert_eq!(result.dropped[1].reason, DropReason::NearDuplicate);
        assert_eq!(result.dropped[1].chunk_id, "c0003");
    }

    #[test]
    fn both_method_merges_drop_records_per_chunk() {
        // [A, A, B]: A2 is dropped by exact (and by simhash at distance 0);
        // the merged record list carries exactly one entry for it.
        let chunks = chunks_from(&[
            "duplicated paragraph content here",
            "duplicated paragraph content here",
            "entirely different closing paragraph",
        ]);
        let result = dedupe(chunks, &DedupeConfig::new().with_method(Method::Both));

        let kept_ids: Vec<&str> = result.kept.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(kept_ids, ["c0001", "c0003"]);

        assert_eq!(result.dropped.len(), 1);
        assert_eq!(result.dropped[0].chunk_id, "c0002");
        assert_eq!(result.dropped[0].reason, DropReason::ExactDuplicate);
        assert_eq!(result.dropped[0].distance, 0);
    }

    #[test]
    fn both_method_dropped_records_in_chunker_order() {
        let chunks = chunks_from(&[
            "first paragraph repeated through the document",
            "unrelated notes about gardening schedules and seasonal vegetables",
            "first paragraph repeated through the document",
            "unrelated notes about gardening schedules and seasonal vegetables",
        ]);
        let result = dedupe(chunks, &DedupeConfig::new().with_method(Method::Both));

        let dropped_ids: Vec<&str> = result.dropped.iter().map(|d| d.chunk_id.as_str()).collect();
        assert_eq!(dropped_ids, ["c0003", "c0004"]);
    }

    #[test]
    fn stats_invariants_hold() {
        let chunks = chunks_from(&[
            "alpha paragraph number one",
            "alpha paragraph number one",
            "beta paragraph number two",
            "gamma paragraph number three",
        ]);
        for method in [Method::Exact, Method::Simhash, Method::Both] {
            let result = dedupe(chunks.clone(), &DedupeConfig::new().with_method(method));
            assert_eq!(
                result.stats.kept_count + result.stats.dropped_count,
                result.stats.input_count,
                "kept + dropped != input for {method}"
            );
            assert_eq!(
                result.stats.exact_dups + result.stats.near_dups,
                result.stats.dropped_count,
                "exact + near != dropped for {method}"
            );
            assert_eq!(result.stats.kept_count, result.kept.len());
            assert_eq!(result.stats.dropped_count, result.dropped.len());
        }
    }

    #[test]
    fn kept_ids_strictly_increasing() {
        let chunks = chunks_from(&[
            "one paragraph of content here",
            "two paragraph of content here",
            "one paragraph of content here",
            "three paragraph of content here",
        ]);
        let result = dedupe(chunks, &DedupeConfig::default());
        let ids: Vec<&String> = result.kept.iter().map(|c| &c.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn matched_chunk_appears_before_dropped_chunk() {
        let chunks = chunks_from(&[
            "repeating paragraph alpha text",
            "unique paragraph beta text",
            "repeating paragraph alpha text",
        ]);
        let result = dedupe(chunks, &DedupeConfig::default());
        for record in &result.dropped {
            assert!(record.matched_chunk_id < record.chunk_id);
            assert!(result.kept.iter().any(|c| c.id == record.matched_chunk_id));
        }
    }

    #[test]
    fn empty_input_yields_zero_stats() {
        let result = dedupe(Vec::new(), &DedupeConfig::default());
        assert!(result.kept.is_empty());
        assert!(result.dropped.is_empty());
        assert_eq!(result.stats.input_count, 0);
        assert_eq!(result.stats.kept_count, 0);
        assert_eq!(result.stats.dropped_count, 0);
    }

    #[test]
    fn out_of_range_config_degrades_to_defaults() {
        let chunks = chunks_from(&["same paragraph content", "same paragraph content"]);
        let cfg = DedupeConfig::new().with_simhash_k(0).with_simhash_threshold(1000);
        let result = dedupe(chunks, &cfg);
        assert_eq!(result.stats.kept_count, 1);
    }
}
