use std::path::PathBuf;

use thiserror::Error;

/// Errors produced during image enumeration and staging.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("input directory does not exist: {0}")]
    MissingDirectory(PathBuf),
    #[error("failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create staging directory {path}: {source}")]
    CreateStagingDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to copy {src} to {dst}: {source}")]
    CopyImage {
        src: PathBuf,
        dst: PathBuf,
        source: std::io::Error,
    },
}
