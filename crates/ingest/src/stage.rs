//! Staging: copy enumerated images into the output tree with sequential,
//! zero-padded names so every downstream tool sees a deterministic order.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::IngestError;

/// Copy images into `out_dir/preprocessed/` as `0001.<ext>`, `0002.<ext>`,
/// ... preserving original extensions (lowercased). Images without an
/// extension default to `.jpg`. Returns the staged paths in order.
pub fn stage_images(image_paths: &[PathBuf], out_dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let staging_dir = out_dir.join("preprocessed");
    fs::create_dir_all(&staging_dir).map_err(|source| IngestError::CreateStagingDir {
        path: staging_dir.clone(),
        source,
    })?;

    let mut staged = Vec::with_capacity(image_paths.len());
    for (i, src) in image_paths.iter().enumerate() {
        let ext = src
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "jpg".to_string());

        let dst = staging_dir.join(format!("{:04}.{ext}", i + 1));
        fs::copy(src, &dst).map_err(|source| IngestError::CopyImage {
            src: src.clone(),
            dst: dst.clone(),
            source,
        })?;
        debug!(src = %src.display(), dst = %dst.display(), "staged image");
        staged.push(dst);
    }

    Ok(staged)
}
