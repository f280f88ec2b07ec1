//! Chrome filtering: suppression of short UI fragments captured by
//! screenshot OCR (clocks, battery indicators, navigation labels).

use regex::Regex;
use tracing::warn;

use crate::chunk::Chunk;

/// Default chrome patterns, written against normalized text (lowercase, no
/// punctuation).
pub fn default_chrome_patterns() -> Vec<String> {
    vec![
        // Timestamps: "1030 am" or "10 30 am"
        r"\d{1,2}\s*\d{2}\s*(am|pm)?".to_string(),
        // Battery / WiFi indicators
        r"\d+\s*%|wifi|battery|charging".to_string(),
        // Browser navigation labels
        r"back|forward|refresh|home|search".to_string(),
        // Bare date triples: "1 1 2024"
        r"\d{1,2}\s*\d{1,2}\s*\d{2,4}".to_string(),
    ]
}

/// Drop chunks whose normalized form matches a chrome pattern, but only when
/// the normalized form is shorter than `max_length` bytes.
///
/// The length gate keeps long paragraphs that merely happen to contain a
/// timestamp or a navigation word. Patterns that fail to compile are skipped
/// with a warning; a bad user-supplied pattern never aborts the run.
pub fn filter_chrome(chunks: Vec<Chunk>, patterns: &[String], max_length: usize) -> Vec<Chunk> {
    if patterns.is_empty() {
        return chunks;
    }

    let compiled: Vec<Regex> = patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                warn!(%pattern, %err, "skipping invalid chrome pattern");
                None
            }
        })
        .collect();

    chunks
        .into_iter()
        .filter(|chunk| {
            let gated = chunk.norm.len() < max_length;
            !(gated && compiled.iter().any(|re| re.is_match(&chunk.norm)))
        })
        .collect()
}
