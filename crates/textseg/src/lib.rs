//! Pagesift text segmentation layer.
//!
//! This crate turns a flat UTF-8 OCR transcript into an ordered sequence of
//! paragraph [`Chunk`]s and renders kept chunks back out as Markdown. It is
//! the first and last stage of the chunk-and-dedup core:
//!
//! ```text
//! Extracted text ──▶ chunk ──▶ chrome filter ──▶ dedupe ──▶ render
//!                      ↑              ↑                        ↑
//!                   (this crate)  (this crate)            (this crate)
//! ```
//!
//! # Core guarantee
//!
//! Chunking and normalization are pure: the same input text always produces
//! the same chunk sequence, ids included. Chunk ids are assigned exactly
//! once, at chunking time; downstream stages may drop chunks but never
//! renumber them.
//!
//! # Quick start
//!
//! ```
//! use textseg::{chunk_text, default_chrome_patterns, filter_chrome, render_markdown};
//!
//! let text = "First paragraph of notes, long enough to keep.\n\n10:30 AM\n\nSecond paragraph of notes, also long enough.";
//! let chunks = chunk_text(text, 10);
//! let kept = filter_chrome(chunks, &default_chrome_patterns(), 100);
//! assert_eq!(kept.len(), 2);
//!
//! let md = render_markdown("Notes", &kept, false);
//! assert!(md.starts_with("# Notes\n\n"));
//! ```

mod chrome;
mod chunk;
mod error;
mod jsonl;
mod normalize;
mod render;

pub use crate::chrome::{default_chrome_patterns, filter_chrome};
pub use crate::chunk::{chunk_text, Chunk};
pub use crate::error::TextError;
pub use crate::jsonl::write_chunks_jsonl;
pub use crate::normalize::normalize;
pub use crate::render::{render_markdown, write_markdown};

/// Truncate `text` to at most `max_bytes` bytes, backing off to the nearest
/// char boundary and appending `...` when anything was cut.
///
/// Used for drop-record previews and the debug JSONL stream.
pub fn truncate_with_ellipsis(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut cut = max_bytes;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}
