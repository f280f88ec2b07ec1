use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the text segmentation layer's file outputs.
///
/// Normalization, chunking, and chrome filtering are pure and infallible;
/// only the writers can fail.
#[derive(Debug, Error)]
pub enum TextError {
    #[error("failed to write markdown file {path}: {source}")]
    WriteMarkdown {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write chunks jsonl file {path}: {source}")]
    WriteJsonl {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode chunk {id} as json: {source}")]
    EncodeChunk {
        id: String,
        source: serde_json::Error,
    },
}
