//! Debug JSONL stream of chunks, emitted before deduplication when
//! requested. One JSON object per line, previews truncated for readability.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::chunk::Chunk;
use crate::error::TextError;
use crate::truncate_with_ellipsis;

const JSONL_PREVIEW_BYTES: usize = 500;

#[derive(Serialize)]
struct ChunkEntry<'a> {
    id: &'a str,
    text: String,
    index: usize,
    len: usize,
}

/// Write chunks to a JSONL file, one object per line.
///
/// The `text` field is truncated to 500 bytes (on a char boundary, with a
/// `...` suffix); `len` reports the length of the original text.
pub fn write_chunks_jsonl(chunks: &[Chunk], path: &Path) -> Result<(), TextError> {
    let file = File::create(path).map_err(|source| TextError::WriteJsonl {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    for chunk in chunks {
        let entry = ChunkEntry {
            id: &chunk.id,
            text: truncate_with_ellipsis(&chunk.text, JSONL_PREVIEW_BYTES),
            index: chunk.index,
            len: chunk.text.len(),
        };
        let line = serde_json::to_string(&entry).map_err(|source| TextError::EncodeChunk {
            id: chunk.id.clone(),
            source,
        })?;
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(|source| TextError::WriteJsonl {
                path: path.to_path_buf(),
                source,
            })?;
    }

    writer.flush().map_err(|source| TextError::WriteJsonl {
        path: path.to_path_buf(),
        source,
    })
}
