//! Paragraph chunking over extracted OCR text.
//!
//! The chunker's only semantic decision is the blank-line boundary: it never
//! inspects or reorders content. Chunk ids are assigned once, at chunking
//! time, and are never reassigned by later pipeline stages.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// A paragraph-sized unit of text with its normalized twin.
///
/// `id`, `text`, `norm`, and `index` are immutable after creation; `norm` is
/// a pure function of `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequential id of the form `c0001`, `c0002`, ... reflecting insertion
    /// order after chunking.
    pub id: String,
    /// Original trimmed paragraph, preserved verbatim for rendering.
    pub text: String,
    /// Normalized form used for all hashing and pattern matching.
    pub norm: String,
    /// 0-based position in the chunked sequence.
    pub index: usize,
}

impl Chunk {
    fn new(ordinal: usize, text: String) -> Self {
        let norm = normalize(&text);
        Self {
            id: format!("c{ordinal:04}"),
            text,
            norm,
            index: ordinal - 1,
        }
    }
}

fn blank_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n+").expect("blank-line regex is valid"))
}

/// Split extracted text into paragraph chunks on blank-line boundaries.
///
/// CRLF and lone CR line endings are treated as LF before splitting.
/// Segments whose trimmed length in bytes is below `min_chars` are dropped
/// silently. If every segment falls under the minimum but the document as a
/// whole does not, the whole document becomes a single chunk rather than
/// vanishing.
pub fn chunk_text(text: &str, min_chars: usize) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut chunks = Vec::new();
    for segment in blank_line_regex().split(&unified) {
        let trimmed = segment.trim();
        if trimmed.len() < min_chars {
            continue;
        }
        chunks.push(Chunk::new(chunks.len() + 1, trimmed.to_string()));
    }

    if chunks.is_empty() {
        let whole = unified.trim();
        if whole.len() >= min_chars {
            chunks.push(Chunk::new(1, whole.to_string()));
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines() {
        let text = "first paragraph here\n\nsecond paragraph here\n\nthird paragraph here";
        let chunks = chunk_text(text, 5);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "first paragraph here");
        assert_eq!(chunks[1].text, "second paragraph here");
        assert_eq!(chunks[2].text, "third paragraph here");
    }

    #[test]
    fn assigns_sequential_ids_and_indices() {
        let chunks = chunk_text("alpha paragraph\n\nbeta paragraph", 3);
        assert_eq!(chunks[0].id, "c0001");
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[1].id, "c0002");
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn splits_on_blank_lines_with_interior_whitespace() {
        let text = "first paragraph\n   \t\n\nsecond paragraph";
        let chunks = chunk_text(text, 3);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn handles_crlf_and_lone_cr() {
        let crlf = chunk_text("one paragraph\r\n\r\ntwo paragraph", 3);
        let cr = chunk_text("one paragraph\r\rtwo paragraph", 3);
        assert_eq!(crlf.len(), 2);
        assert_eq!(cr.len(), 2);
        assert_eq!(crlf[1].text, "two paragraph");
    }

    #[test]
    fn drops_segments_below_minimum() {
        let chunks = chunk_text("tiny\n\na paragraph that is long enough to keep", 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "c0001");
        assert!(chunks[0].text.starts_with("a paragraph"));
    }

    #[test]
    fn minimum_length_boundary_is_inclusive() {
        // Exactly min_chars bytes is kept; one byte shorter is dropped.
        let at = "x".repeat(10);
        let under = "x".repeat(9);
        assert_eq!(chunk_text(&at, 10).len(), 1);
        assert_eq!(chunk_text(&under, 10).len(), 0);
    }

    #[test]
    fn single_segment_without_separator() {
        let chunks = chunk_text("just one paragraph with no blank lines", 5);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "c0001");
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn whole_document_fallback_when_all_segments_short() {
        // Each segment is under the minimum, but the whole document is not.
        let chunks = chunk_text("abc\n\ndef\n\nghi", 5);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "abc\n\ndef\n\nghi");
    }

    #[test]
    fn empty_and_whitespace_inputs_yield_no_chunks() {
        assert!(chunk_text("", 1).is_empty());
        assert!(chunk_text("   \n\n  \t ", 1).is_empty());
    }

    #[test]
    fn norm_is_derived_from_text() {
        let chunks = chunk_text("Hello,   WORLD! Again.", 3);
        assert_eq!(chunks[0].norm, "hello world again");
        assert_eq!(chunks[0].norm, normalize(&chunks[0].text));
    }

    #[test]
    fn trims_surrounding_whitespace_per_segment() {
        let chunks = chunk_text("   padded paragraph   \n\n\t also padded \t", 5);
        assert_eq!(chunks[0].text, "padded paragraph");
        assert_eq!(chunks[1].text, "also padded");
    }
}
