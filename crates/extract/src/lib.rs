//! External OCR toolchain wrappers.
//!
//! Three tools turn staged page images into a flat text file:
//!
//! ```text
//! preprocessed/*.jpg ──▶ img2pdf ──▶ combined.pdf
//! combined.pdf       ──▶ ocrmypdf ──▶ combined_ocr.pdf
//! combined_ocr.pdf   ──▶ pdftotext ──▶ extracted.txt
//! ```
//!
//! Each wrapper verifies the expected output file actually appeared; a tool
//! that exits 0 without producing its artifact is still a failure.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use runner::{OutputMode, RunError, RunOpts, Runner};

/// Minimum number of non-whitespace bytes for extracted text to count as a
/// successful OCR run.
const MIN_EXTRACTED_BYTES: usize = 20;

/// Errors from the external extraction toolchain.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no image files found in preprocessed directory: {0}")]
    NoImages(PathBuf),
    #[error("failed to list preprocessed images in {path}: {source}")]
    ListImages {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{tool} failed: {source}")]
    Tool { tool: &'static str, source: RunError },
    #[error("{tool} completed but output file not found: {path}")]
    MissingOutput { tool: &'static str, path: PathBuf },
    #[error("failed to read extracted text {path}: {source}")]
    ReadExtracted {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(
        "extracted text is too short ({len} bytes, minimum {MIN_EXTRACTED_BYTES}): likely OCR failure or empty PDF"
    )]
    TextTooShort { len: usize },
    #[error("failed to remove artifact {path}: {source}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn run_opts(timeout: Duration) -> RunOpts {
    RunOpts {
        timeout: Some(timeout),
        stdout_mode: OutputMode::StreamAndCapture,
        stderr_mode: OutputMode::StreamAndCapture,
        ..Default::default()
    }
}

fn ensure_output(tool: &'static str, path: PathBuf) -> Result<PathBuf, ExtractError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ExtractError::MissingOutput { tool, path })
    }
}

/// Combine staged images into a single PDF via `img2pdf`.
///
/// Images are taken from `preprocessed_dir` in sorted order (staging already
/// assigned zero-padded names) and written to `out_dir/combined.pdf`.
pub fn build_pdf(
    preprocessed_dir: &Path,
    out_dir: &Path,
    timeout: Duration,
) -> Result<PathBuf, ExtractError> {
    let mut images = Vec::new();
    let entries = fs::read_dir(preprocessed_dir).map_err(|source| ExtractError::ListImages {
        path: preprocessed_dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ExtractError::ListImages {
            path: preprocessed_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if matches!(ext.as_str(), "jpg" | "jpeg" | "png") {
            images.push(path);
        }
    }
    if images.is_empty() {
        return Err(ExtractError::NoImages(preprocessed_dir.to_path_buf()));
    }
    images.sort();

    let output = out_dir.join("combined.pdf");
    let mut args: Vec<String> = vec!["-m".into(), "img2pdf".into()];
    args.extend(images.iter().map(|p| p.to_string_lossy().into_owned()));
    args.push("-o".into());
    args.push(output.to_string_lossy().into_owned());
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

    info!(images = images.len(), "building pdf with img2pdf");
    Runner::new()
        .run("python3", &arg_refs, &run_opts(timeout))
        .map_err(|source| ExtractError::Tool {
            tool: "img2pdf",
            source,
        })?;

    ensure_output("img2pdf", output)
}

/// Run OCR over a PDF via `ocrmypdf`, producing `out_dir/combined_ocr.pdf`.
pub fn ocr_pdf(
    pdf_path: &Path,
    out_dir: &Path,
    lang: &str,
    timeout: Duration,
) -> Result<PathBuf, ExtractError> {
    let output = out_dir.join("combined_ocr.pdf");
    let pdf = pdf_path.to_string_lossy();
    let out = output.to_string_lossy();
    let args = ["--deskew", "--rotate-pages", "-l", lang, pdf.as_ref(), out.as_ref()];

    info!(%lang, "running ocrmypdf");
    Runner::new()
        .run("ocrmypdf", &args, &run_opts(timeout))
        .map_err(|source| ExtractError::Tool {
            tool: "ocrmypdf",
            source,
        })?;

    ensure_output("ocrmypdf", output)
}

/// Extract layout-preserving text from an OCR'd PDF via `pdftotext`,
/// producing `out_dir/extracted.txt`.
///
/// Rejects results shorter than 20 non-whitespace bytes as a likely OCR
/// failure.
pub fn extract_text(
    pdf_path: &Path,
    out_dir: &Path,
    timeout: Duration,
) -> Result<PathBuf, ExtractError> {
    let output = out_dir.join("extracted.txt");
    let pdf = pdf_path.to_string_lossy();
    let out = output.to_string_lossy();
    let args = ["-layout", pdf.as_ref(), out.as_ref()];

    info!("extracting text with pdftotext");
    Runner::new()
        .run("pdftotext", &args, &run_opts(timeout))
        .map_err(|source| ExtractError::Tool {
            tool: "pdftotext",
            source,
        })?;

    let output = ensure_output("pdftotext", output)?;
    let content = fs::read_to_string(&output).map_err(|source| ExtractError::ReadExtracted {
        path: output.clone(),
        source,
    })?;
    let len = content.trim().len();
    if len < MIN_EXTRACTED_BYTES {
        return Err(ExtractError::TextTooShort { len });
    }

    Ok(output)
}

/// Remove an intermediate artifact if it exists. Errors only when the file
/// exists and deletion fails.
pub fn cleanup_artifact(path: &Path) -> Result<(), ExtractError> {
    if !path.exists() {
        return Ok(());
    }
    fs::remove_file(path).map_err(|source| ExtractError::Cleanup {
        path: path.to_path_buf(),
        source,
    })
}
