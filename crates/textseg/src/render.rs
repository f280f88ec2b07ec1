//! Markdown rendering and file output for kept chunks.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::chunk::Chunk;
use crate::error::TextError;

/// Render kept chunks into a Markdown document.
///
/// The document starts with a single H1 (`title`, or "Extracted Notes" when
/// the title is empty) and each chunk is separated by exactly one blank
/// line. When `include_chunk_ids` is set, each chunk is preceded by an HTML
/// comment carrying its id, which survives Markdown rendering invisibly.
pub fn render_markdown(title: &str, chunks: &[Chunk], include_chunk_ids: bool) -> String {
    let title = if title.is_empty() {
        "Extracted Notes"
    } else {
        title
    };

    let mut out = String::new();
    out.push_str("# ");
    out.push_str(title);
    out.push_str("\n\n");

    for chunk in chunks {
        if include_chunk_ids {
            out.push_str("<!-- ");
            out.push_str(&chunk.id);
            out.push_str(" -->\n");
        }
        out.push_str(&chunk.text);
        out.push_str("\n\n");
    }

    out
}

/// Write Markdown content with consistent line endings.
///
/// Any `\r\n` or `\r` in the content is normalized to `\n`, trailing
/// newlines are stripped, and exactly one final `\n` is appended so the file
/// ends with a single terminating newline.
pub fn write_markdown(content: &str, path: &Path) -> Result<(), TextError> {
    let file = File::create(path).map_err(|source| TextError::WriteMarkdown {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    let unified = content.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed = unified.trim_end_matches('\n');

    writer
        .write_all(trimmed.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .and_then(|()| writer.flush())
        .map_err(|source| TextError::WriteMarkdown {
            path: path.to_path_buf(),
            source,
        })
}
