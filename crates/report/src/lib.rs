//! Deduplication report for pagesift.
//!
//! The report is the audit artifact of a pipeline run: counts per stage,
//! the effective dedup configuration, and one record per dropped chunk. It
//! is written as pretty-printed JSON so a human can read it directly.
//!
//! The `timestamp` field is the only non-deterministic output of the
//! pipeline; determinism checks must exclude it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dedupe::{DedupeConfig, DedupeResult, DroppedChunk, Method};

/// Errors produced when writing the report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to encode report as json: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write report file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Snapshot of the dedup configuration, as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub method: Method,
    pub simhash_k: usize,
    pub simhash_threshold: u32,
    pub window: usize,
}

impl From<&DedupeConfig> for ReportConfig {
    fn from(cfg: &DedupeConfig) -> Self {
        Self {
            method: cfg.method,
            simhash_k: cfg.simhash_k,
            simhash_threshold: cfg.simhash_threshold,
            window: cfg.window,
        }
    }
}

/// Deduplication report document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Number of source images, supplied by the caller; 0 when the run
    /// started from a bare text file.
    pub input_images: usize,
    pub input_chunks: usize,
    pub kept_chunks: usize,
    pub dropped_chunks: usize,
    pub exact_duplicates: usize,
    pub near_duplicates: usize,
    pub config: ReportConfig,
    pub dropped: Vec<DroppedChunk>,
    /// RFC-3339 timestamp with local offset.
    pub timestamp: String,
}

impl Report {
    /// Build a report from a dedup result and the configuration that
    /// produced it, stamped with the current local time.
    pub fn new(result: &DedupeResult, input_images: usize, cfg: &DedupeConfig) -> Self {
        Self {
            input_images,
            input_chunks: result.stats.input_count,
            kept_chunks: result.stats.kept_count,
            dropped_chunks: result.stats.dropped_count,
            exact_duplicates: result.stats.exact_dups,
            near_duplicates: result.stats.near_dups,
            config: ReportConfig::from(cfg),
            dropped: result.dropped.clone(),
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Write the report as pretty-printed JSON (two-space indentation).
pub fn write_report(
    result: &DedupeResult,
    input_images: usize,
    cfg: &DedupeConfig,
    path: &Path,
) -> Result<(), ReportError> {
    let report = Report::new(result, input_images, cfg);
    let json = serde_json::to_string_pretty(&report)?;

    let file = File::create(path).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(json.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
}
