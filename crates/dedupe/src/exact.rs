//! Exact duplicate removal via content digests of normalized text.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use textseg::Chunk;

use crate::types::{DropReason, DroppedChunk};

/// Digest of a chunk's normalized form, hex-encoded.
fn norm_digest(norm: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(norm.as_bytes());
    hex::encode(hasher.finalize())
}

/// Remove exact duplicates, keeping the first occurrence of each normalized
/// form.
///
/// Chunks with an empty normalized form are kept unconditionally and never
/// recorded in the digest map; they would otherwise all collide on the empty
/// digest. Both output sequences preserve input order.
pub fn exact_dedupe(chunks: &[Chunk]) -> (Vec<Chunk>, Vec<DroppedChunk>) {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut kept = Vec::with_capacity(chunks.len());
    let mut dropped = Vec::new();

    for chunk in chunks {
        if chunk.norm.is_empty() {
            kept.push(chunk.clone());
            continue;
        }

        let digest = norm_digest(&chunk.norm);
        match seen.get(&digest) {
            Some(first_id) => {
                dropped.push(DroppedChunk::new(
                    chunk,
                    DropReason::ExactDuplicate,
                    first_id,
                    0,
                ));
            }
            None => {
                seen.insert(digest, chunk.id.clone());
                kept.push(chunk.clone());
            }
        }
    }

    (kept, dropped)
}
