//! Deterministic text normalization for hashing and pattern matching.
//!
//! Every dedup decision downstream operates on the normalized form produced
//! here, never on the original paragraph text. The transform is pure and
//! idempotent: `normalize(normalize(x)) == normalize(x)` for all inputs.

/// Normalize raw text into the canonical form used for hashing.
///
/// The transform, in order:
/// 1. Unicode-aware lowercasing.
/// 2. Tabs become spaces.
/// 3. Only letters, digits, the space character, and line feeds survive;
///    every other code point (punctuation, symbols, CR and other controls)
///    is discarded.
/// 4. Runs of spaces collapse to a single space, runs of line feeds to a
///    single line feed.
/// 5. Leading and trailing whitespace is trimmed.
///
/// Newlines are preserved (collapsed, not removed) so that normalized text
/// keeps its paragraph-internal line structure.
///
/// # Examples
///
/// ```
/// use textseg::normalize;
///
/// assert_eq!(normalize("Hello,   WORLD!\n\n\n"), "hello world");
/// assert_eq!(normalize(""), "");
/// assert_eq!(normalize("Caf\u{00E9} #1"), "caf\u{00E9} 1");
/// ```
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let lowered = raw.to_lowercase();
    let mut out = String::with_capacity(lowered.len());

    for ch in lowered.chars() {
        let ch = if ch == '\t' { ' ' } else { ch };
        let keep = ch.is_alphabetic() || ch.is_numeric() || ch == ' ' || ch == '\n';
        if !keep {
            continue;
        }
        // Collapse runs as we go: a space after a space or a line feed after
        // a line feed is dropped.
        if (ch == ' ' || ch == '\n') && out.ends_with(ch) {
            continue;
        }
        out.push(ch);
    }

    let trimmed = out.trim();
    if trimmed.len() == out.len() {
        out
    } else {
        trimmed.to_string()
    }
}
