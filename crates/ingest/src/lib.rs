//! Pagesift ingest layer: finding and staging page images.
//!
//! The entry point of an image run. This crate enumerates page images from
//! an input directory, orders them the way a human would (`IMG_9` before
//! `IMG_10`), and stages copies under the output directory with sequential
//! names so PDF synthesis sees a deterministic page order.
//!
//! ```text
//! input dir ──▶ list_images ──▶ stage_images ──▶ out/preprocessed/0001.jpg ...
//! ```

mod error;
mod natural;
mod stage;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

pub use crate::error::IngestError;
pub use crate::natural::natural_sort;
pub use crate::stage::stage_images;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Enumerate image files (`.jpg`, `.jpeg`, `.png`, case-insensitive) under
/// `dir`, returning absolute paths in natural order.
///
/// With `recursive` set, subdirectories are walked; otherwise only the top
/// level is scanned.
pub fn list_images(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, IngestError> {
    if !dir.is_dir() {
        return Err(IngestError::MissingDirectory(dir.to_path_buf()));
    }
    let abs_dir = dir
        .canonicalize()
        .map_err(|source| IngestError::ReadDirectory {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut images = Vec::new();
    collect_images(&abs_dir, recursive, &mut images)?;
    debug!(dir = %abs_dir.display(), count = images.len(), "enumerated images");
    Ok(natural_sort(images))
}

fn collect_images(
    dir: &Path,
    recursive: bool,
    images: &mut Vec<PathBuf>,
) -> Result<(), IngestError> {
    let entries = fs::read_dir(dir).map_err(|source| IngestError::ReadDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| IngestError::ReadDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_images(&path, recursive, images)?;
            }
        } else if is_image(&path) {
            images.push(path);
        }
    }
    Ok(())
}
