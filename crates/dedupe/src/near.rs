//! Near-duplicate removal via SimHash signatures within a sliding window.

use textseg::Chunk;

use crate::config::DedupeConfig;
use crate::simhash::{hamming, simhash64};
use crate::types::{DropReason, DroppedChunk};

/// Remove near-duplicates: a chunk is dropped when its SimHash signature
/// lies within `simhash_threshold` Hamming bits of a previously kept chunk
/// inside the sliding window.
///
/// The window bounds how far back the comparison looks; `window == 0` means
/// every kept chunk is a candidate. When several kept chunks tie for the
/// minimum distance, the earliest one wins. Kept chunks are appended to the
/// window only after their own comparison, so a chunk never matches itself.
pub fn simhash_dedupe(chunks: &[Chunk], cfg: &DedupeConfig) -> (Vec<Chunk>, Vec<DroppedChunk>) {
    let mut kept: Vec<Chunk> = Vec::with_capacity(chunks.len());
    let mut kept_sigs: Vec<u64> = Vec::with_capacity(chunks.len());
    let mut dropped = Vec::new();

    for chunk in chunks {
        let sig = simhash64(&chunk.norm, cfg.simhash_k);

        let window_start = if cfg.window > 0 && kept.len() > cfg.window {
            kept.len() - cfg.window
        } else {
            0
        };

        let mut best: Option<(usize, u32)> = None;
        for (j, &kept_sig) in kept_sigs.iter().enumerate().skip(window_start) {
            let dist = hamming(sig, kept_sig);
            let closer = match best {
                Some((_, min_dist)) => dist < min_dist,
                None => true,
            };
            if dist <= cfg.simhash_threshold && closer {
                best = Some((j, dist));
            }
        }

        match best {
            Some((j, dist)) => {
                dropped.push(DroppedChunk::new(
                    chunk,
                    DropReason::NearDuplicate,
                    &kept[j].id,
                    dist,
                ));
            }
            None => {
                kept.push(chunk.clone());
                kept_sigs.push(sig);
            }
        }
    }

    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use textseg::chunk_text;

    fn chunks_from(texts: &[&str]) -> Vec<Chunk> {
        chunk_text(&texts.join("\n\n"), 1)
    }

    fn cfg() -> DedupeConfig {
        DedupeConfig::default()
    }

    #[test]
    fn identical_norms_drop_at_distance_zero() {
        let chunks = chunks_from(&["repeated paragraph text", "repeated paragraph text"]);
        let (kept, dropped) = simhash_dedupe(&chunks, &cfg());
        assert_eq!(kept.len(), 1);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].distance, 0);
        assert_eq!(dropped[0].matched_chunk_id, "c0001");
        assert_eq!(dropped[0].reason, DropReason::NearDuplicate);
    }

    #[test]
    fn near_duplicate_dropped_against_earlier_chunk() {
        let chunks = chunks_from(&[
            "the quarterly report shows revenue increased by fifteen percent this year",
            "an entirely different paragraph about gardening tools and recipes instead",
            "the quarterly report shows revenue increased by sixteen percent this year",
        ]);
        let (kept, dropped) = simhash_dedupe(&chunks, &cfg());
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].chunk_id, "c0003");
        assert_eq!(dropped[0].matched_chunk_id, "c0001");
        assert!(dropped[0].distance <= 6);
    }

    #[test]
    fn window_of_one_limits_lookback() {
        // [X, Y, X]: with window 1 the third chunk only compares against Y,
        // so all three survive.
        let chunks = chunks_from(&[
            "alpha paragraph about the first distinct topic of the document",
            "completely unrelated beta paragraph concerning different subject matter",
            "alpha paragraph about the first distinct topic of the document",
        ]);
        let config = cfg().with_window(1);
        let (kept, dropped) = simhash_dedupe(&chunks, &config);
        assert_eq!(kept.len(), 3);
        assert!(dropped.is_empty());
    }

    #[test]
    fn window_zero_compares_against_all_kept() {
        let chunks = chunks_from(&[
            "alpha paragraph about the first distinct topic of the document",
            "completely unrelated beta paragraph concerning different subject matter",
            "alpha paragraph about the first distinct topic of the document",
        ]);
        let config = cfg().with_window(0);
        let (kept, dropped) = simhash_dedupe(&chunks, &config);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].matched_chunk_id, "c0001");
    }

    #[test]
    fn threshold_zero_requires_identical_signatures() {
        let chunks = chunks_from(&[
            "the quarterly report shows revenue increased by fifteen percent this year",
            "completely unrelated paragraph about gardening tools and cooking recipes",
        ]);
        let config = cfg().with_simhash_threshold(0);
        let (kept, dropped) = simhash_dedupe(&chunks, &config);
        // Non-identical signatures survive a zero threshold.
        assert_eq!(kept.len(), 2);
        assert!(dropped.is_empty());

        let identical = chunks_from(&["same exact paragraph", "same exact paragraph"]);
        let (kept, dropped) = simhash_dedupe(&identical, &config);
        assert_eq!(kept.len(), 1);
        assert_eq!(dropped.len(), 1);
    }

    #[test]
    fn earliest_chunk_wins_distance_ties() {
        // Two identical kept chunks cannot both exist (the second would be
        // dropped), so force a tie through the window: identical texts at
        // distance 0 always match the first kept occurrence.
        let chunks = chunks_from(&[
            "tie breaking paragraph candidate text",
            "some unrelated filler paragraph about other things entirely",
            "tie breaking paragraph candidate text",
            "tie breaking paragraph candidate text",
        ]);
        let (kept, dropped) = simhash_dedupe(&chunks, &cfg());
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped.len(), 2);
        assert!(dropped.iter().all(|d| d.matched_chunk_id == "c0001"));
    }

    #[test]
    fn empty_norm_chunks_share_zero_signature() {
        // Punctuation-only chunks normalize to "" and all carry signature 0:
        // the first is kept, later ones drop against it at distance 0.
        let chunks = chunks_from(&["!!!", "???", "real paragraph content here"]);
        let (kept, dropped) = simhash_dedupe(&chunks, &cfg());
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].chunk_id, "c0002");
        assert_eq!(dropped[0].matched_chunk_id, "c0001");
    }

    #[test]
    fn empty_input() {
        let (kept, dropped) = simhash_dedupe(&[], &cfg());
        assert!(kept.is_empty());
        assert!(dropped.is_empty());
    }
}
