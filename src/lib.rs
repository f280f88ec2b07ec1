//! Workspace umbrella crate for pagesift.
//!
//! Pagesift turns a directory of page-like raster images (screenshots,
//! photos, scans) into a single deduplicated Markdown transcript. The
//! `pagesift` crate re-exports the ingest, extraction, text segmentation,
//! dedup, and report layers so applications can drive the full pipeline
//! through a single dependency, and provides the orchestration helpers
//! [`process_text`] and [`distill_to_dir`] for the chunk-and-dedup core.
//!
//! ```text
//! images ──▶ ingest ──▶ img2pdf ──▶ ocrmypdf ──▶ pdftotext ──▶ distill
//!                                                                 │
//!                              chunk ── chrome ── dedupe ── render ┘
//! ```
//!
//! ## Quick start
//!
//! ```
//! use pagesift::{process_text, DistillOptions};
//!
//! let text = "A paragraph worth keeping around.\n\nA paragraph worth keeping around.\n\nNotes on the garden harvest and the autumn canning schedule.";
//! let opts = DistillOptions {
//!     min_chunk_chars: 10,
//!     ..Default::default()
//! };
//!
//! let outcome = process_text(text, &opts);
//! assert_eq!(outcome.result.stats.input_count, 3);
//! assert_eq!(outcome.result.stats.kept_count, 2);
//! assert!(outcome.markdown.starts_with("# Extracted Notes\n"));
//! ```
//!
//! ## Determinism
//!
//! The core is single-threaded and synchronous. For identical input bytes
//! and identical configuration, `result.md` is byte-identical across runs;
//! only the report's `timestamp` field varies.
//!
//! ## Observability
//!
//! Stage latencies can be captured by installing a [`PipelineMetrics`]
//! recorder via [`set_pipeline_metrics`]. Library crates log through
//! `tracing`; the CLI binary installs the subscriber.

pub use dedupe::{
    dedupe, hamming, simhash64, DedupeConfig, DedupeResult, DedupeStats, DropReason,
    DroppedChunk, Method,
};
pub use extract::{build_pdf, cleanup_artifact, extract_text, ocr_pdf, ExtractError};
pub use ingest::{list_images, natural_sort, stage_images, IngestError};
pub use report::{write_report, Report, ReportConfig, ReportError};
pub use runner::{OutputMode, RunError, RunOpts, RunResult, Runner};
pub use textseg::{
    chunk_text, default_chrome_patterns, filter_chrome, normalize, render_markdown,
    write_chunks_jsonl, write_markdown, Chunk, TextError,
};

pub mod config;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read extracted text {path}: {source}")]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("ingest failure: {0}")]
    Ingest(#[from] IngestError),
    #[error("extraction failure: {0}")]
    Extract(#[from] ExtractError),
    #[error("text output failure: {0}")]
    Text(#[from] TextError),
    #[error("report failure: {0}")]
    Report(#[from] ReportError),
}

/// Processing stage captured in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Ingest,
    Synthesize,
    Ocr,
    Extract,
    Chunk,
    Dedupe,
    Render,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Ingest => "ingest",
            PipelineStage::Synthesize => "synthesize",
            PipelineStage::Ocr => "ocr",
            PipelineStage::Extract => "extract",
            PipelineStage::Chunk => "chunk",
            PipelineStage::Dedupe => "dedupe",
            PipelineStage::Render => "render",
        };
        f.write_str(name)
    }
}

/// Observer for pipeline stage outcomes.
pub trait PipelineMetrics: Send + Sync {
    fn record_stage(&self, stage: PipelineStage, latency: Duration, error: Option<&str>);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Timing guard for one pipeline stage. Dropping without [`finish`] records
/// nothing.
///
/// [`finish`]: StageSpan::finish
pub struct StageSpan {
    recorder: Option<Arc<dyn PipelineMetrics>>,
    stage: PipelineStage,
    start: Instant,
}

impl StageSpan {
    pub fn start(stage: PipelineStage) -> Self {
        Self {
            recorder: metrics_recorder(),
            stage,
            start: Instant::now(),
        }
    }

    pub fn finish(self, error: Option<&str>) {
        if let Some(recorder) = self.recorder {
            recorder.record_stage(self.stage, self.start.elapsed(), error);
        }
    }
}

/// Options for the chunk-and-dedup core.
#[derive(Debug, Clone)]
pub struct DistillOptions {
    /// Minimum paragraph length in bytes to keep a chunk.
    pub min_chunk_chars: usize,
    /// Chrome filter patterns, applied to normalized text.
    pub chrome_patterns: Vec<String>,
    /// Length gate for the chrome filter.
    pub chrome_max_length: usize,
    pub dedupe: DedupeConfig,
    /// H1 for the rendered Markdown.
    pub markdown_title: String,
    /// Emit `<!-- cNNNN -->` comments before each chunk.
    pub include_chunk_ids: bool,
    /// Write the `chunks_raw.jsonl` debug stream before dedup.
    pub emit_chunks_jsonl: bool,
}

impl Default for DistillOptions {
    fn default() -> Self {
        Self {
            min_chunk_chars: 60,
            chrome_patterns: default_chrome_patterns(),
            chrome_max_length: 100,
            dedupe: DedupeConfig::default(),
            markdown_title: "Extracted Notes".to_string(),
            include_chunk_ids: false,
            emit_chunks_jsonl: true,
        }
    }
}

/// Outcome of the in-memory core: the dedup result plus the rendered
/// Markdown, and the chunk counts observed before dedup.
#[derive(Debug, Clone)]
pub struct DistillOutcome {
    pub result: DedupeResult,
    pub markdown: String,
    /// Chunks produced by the chunker, before chrome filtering.
    pub raw_chunks: usize,
    /// Chunks surviving the chrome filter, as handed to dedup.
    pub filtered_chunks: usize,
}

/// Run the pure chunk → chrome filter → dedup → render core over an
/// in-memory document.
pub fn process_text(text: &str, opts: &DistillOptions) -> DistillOutcome {
    let chunk_span = StageSpan::start(PipelineStage::Chunk);
    let raw = chunk_text(text, opts.min_chunk_chars);
    let raw_chunks = raw.len();
    let filtered = filter_chrome(raw, &opts.chrome_patterns, opts.chrome_max_length);
    let filtered_chunks = filtered.len();
    chunk_span.finish(None);
    info!(raw = raw_chunks, filtered = filtered_chunks, "chunking finished");

    let dedupe_span = StageSpan::start(PipelineStage::Dedupe);
    let result = dedupe(filtered, &opts.dedupe);
    dedupe_span.finish(None);
    info!(
        kept = result.stats.kept_count,
        exact = result.stats.exact_dups,
        near = result.stats.near_dups,
        "deduplication finished"
    );

    let render_span = StageSpan::start(PipelineStage::Render);
    let markdown = render_markdown(&opts.markdown_title, &result.kept, opts.include_chunk_ids);
    render_span.finish(None);

    DistillOutcome {
        result,
        markdown,
        raw_chunks,
        filtered_chunks,
    }
}

/// Paths and statistics of a completed distill run.
#[derive(Debug, Clone)]
pub struct DistillSummary {
    pub stats: DedupeStats,
    pub markdown_path: PathBuf,
    pub report_path: PathBuf,
    pub chunks_jsonl_path: Option<PathBuf>,
}

/// Run the core over an extracted text file and write the output artifacts
/// into `out_dir`: `result.md`, `dedupe_report.json`, and (when enabled)
/// `chunks_raw.jsonl`.
///
/// `input_images` is the number of source images reported by the caller; 0
/// when the run started from a bare text file. Zero kept chunks is not an
/// error: the Markdown then contains only the title header.
pub fn distill_to_dir(
    text_path: &Path,
    out_dir: &Path,
    input_images: usize,
    opts: &DistillOptions,
) -> Result<DistillSummary, PipelineError> {
    let text = fs::read_to_string(text_path).map_err(|source| PipelineError::ReadInput {
        path: text_path.to_path_buf(),
        source,
    })?;

    // The debug stream captures chunks as dedup saw them, so it is written
    // between filtering and dedup rather than from the outcome.
    let chunk_span = StageSpan::start(PipelineStage::Chunk);
    let raw = chunk_text(&text, opts.min_chunk_chars);
    let raw_chunks = raw.len();
    let filtered = filter_chrome(raw, &opts.chrome_patterns, opts.chrome_max_length);
    chunk_span.finish(None);
    info!(raw = raw_chunks, filtered = filtered.len(), "chunking finished");

    let chunks_jsonl_path = if opts.emit_chunks_jsonl {
        let path = out_dir.join("chunks_raw.jsonl");
        write_chunks_jsonl(&filtered, &path)?;
        Some(path)
    } else {
        None
    };

    let dedupe_span = StageSpan::start(PipelineStage::Dedupe);
    let result = dedupe(filtered, &opts.dedupe);
    dedupe_span.finish(None);
    info!(
        input = result.stats.input_count,
        kept = result.stats.kept_count,
        dropped = result.stats.dropped_count,
        "deduplication finished"
    );

    let report_path = out_dir.join("dedupe_report.json");
    write_report(&result, input_images, &opts.dedupe.validated(), &report_path)?;

    let render_span = StageSpan::start(PipelineStage::Render);
    let markdown = render_markdown(&opts.markdown_title, &result.kept, opts.include_chunk_ids);
    let markdown_path = out_dir.join("result.md");
    let render_result = write_markdown(&markdown, &markdown_path);
    render_span.finish(render_result.as_ref().err().map(|e| e.to_string()).as_deref());
    render_result?;

    if result.stats.kept_count == 0 {
        warn!("no chunks survived the pipeline; result.md contains only the title");
    }

    Ok(DistillSummary {
        stats: result.stats,
        markdown_path,
        report_path,
        chunks_jsonl_path,
    })
}
