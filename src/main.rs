//! Pagesift command-line interface.

mod doctor;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pagesift::config::PagesiftConfig;
use pagesift::{
    build_pdf, cleanup_artifact, distill_to_dir, extract_text, list_images, ocr_pdf,
    stage_images, PipelineStage, StageSpan,
};

#[derive(Parser)]
#[command(
    name = "pagesift",
    version,
    about = "Turn a directory of page images into deduplicated Markdown notes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: images -> PDF -> OCR -> text -> Markdown.
    Run(RunArgs),
    /// Check that the external OCR toolchain is installed and working.
    Doctor {
        /// Run an end-to-end smoke test in a temporary directory.
        #[arg(long)]
        smoke: bool,
    },
    /// Print the version.
    Version,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Input directory containing images.
    #[arg(long, default_value = "input")]
    input: PathBuf,

    /// Output directory for results.
    #[arg(long, default_value = "output")]
    out: PathBuf,

    /// YAML configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep intermediate artifacts (combined.pdf, combined_ocr.pdf).
    #[arg(long)]
    keep_artifacts: Option<bool>,

    /// OCR language.
    #[arg(long)]
    lang: Option<String>,

    /// Recursively search subdirectories for images.
    #[arg(long)]
    recursive: Option<bool>,

    /// Timeout for PDF synthesis, in seconds.
    #[arg(long = "pdf-timeout")]
    pdf_timeout_secs: Option<u64>,

    /// Timeout for OCR processing, in seconds.
    #[arg(long = "ocr-timeout")]
    ocr_timeout_secs: Option<u64>,

    /// Timeout for text extraction, in seconds.
    #[arg(long = "extract-timeout")]
    extract_timeout_secs: Option<u64>,

    /// Minimum chunk size in bytes.
    #[arg(long)]
    min_chunk_chars: Option<usize>,

    /// Emit the chunks_raw.jsonl debug stream.
    #[arg(long)]
    emit_chunks_jsonl: Option<bool>,

    /// Extra chrome filtering regex (repeatable); appended to the default
    /// pattern set.
    #[arg(long = "chrome-regex")]
    chrome_regex: Vec<String>,

    /// Character k-gram size for SimHash.
    #[arg(long)]
    simhash_k: Option<usize>,

    /// Hamming distance threshold for SimHash.
    #[arg(long)]
    simhash_threshold: Option<u32>,

    /// Sliding window size for deduplication; 0 compares against all kept.
    #[arg(long)]
    window: Option<usize>,

    /// Deduplication method: exact, simhash, or both.
    #[arg(long)]
    dedupe: Option<String>,

    /// Title for the Markdown document.
    #[arg(long)]
    markdown_title: Option<String>,

    /// Include chunk IDs as HTML comments in the Markdown.
    #[arg(long)]
    include_chunk_ids: Option<bool>,
}

impl RunArgs {
    /// Load the config file (or defaults) and fold explicit flags over it.
    fn effective_config(&self) -> anyhow::Result<PagesiftConfig> {
        let mut config = match &self.config {
            Some(path) => PagesiftConfig::from_file(path)
                .with_context(|| format!("loading config file {}", path.display()))?,
            None => PagesiftConfig::default(),
        };

        if let Some(v) = self.keep_artifacts {
            config.ingest.keep_artifacts = v;
        }
        if let Some(v) = self.recursive {
            config.ingest.recursive = v;
        }
        if let Some(v) = &self.lang {
            config.ocr.lang = v.clone();
        }
        if let Some(v) = self.pdf_timeout_secs {
            config.ocr.pdf_timeout_secs = v;
        }
        if let Some(v) = self.ocr_timeout_secs {
            config.ocr.ocr_timeout_secs = v;
        }
        if let Some(v) = self.extract_timeout_secs {
            config.ocr.extract_timeout_secs = v;
        }
        if let Some(v) = self.min_chunk_chars {
            config.chunk.min_chunk_chars = v;
        }
        if let Some(v) = self.emit_chunks_jsonl {
            config.chunk.emit_chunks_jsonl = v;
        }
        config.chrome.extra_patterns.extend(self.chrome_regex.iter().cloned());
        if let Some(v) = self.simhash_k {
            config.dedupe.simhash_k = v;
        }
        if let Some(v) = self.simhash_threshold {
            config.dedupe.simhash_threshold = v;
        }
        if let Some(v) = self.window {
            config.dedupe.window = v;
        }
        if let Some(v) = &self.dedupe {
            config.dedupe.method = v.clone();
        }
        if let Some(v) = &self.markdown_title {
            config.render.markdown_title = v.clone();
        }
        if let Some(v) = self.include_chunk_ids {
            config.render.include_chunk_ids = v;
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Run(args) => run_command(&args),
        Commands::Doctor { smoke } => doctor::doctor_command(smoke),
        Commands::Version => {
            println!("pagesift version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_command(args: &RunArgs) -> anyhow::Result<()> {
    let config = args.effective_config()?;

    if !args.input.is_dir() {
        bail!("input directory does not exist: {}", args.input.display());
    }
    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create output directory {}", args.out.display()))?;

    info!(input = %args.input.display(), out = %args.out.display(), "starting pipeline");

    let ingest_span = StageSpan::start(PipelineStage::Ingest);
    let images = list_images(&args.input, config.ingest.recursive)?;
    info!(count = images.len(), recursive = config.ingest.recursive, "images found");
    if images.is_empty() {
        ingest_span.finish(None);
        warn!("no images found in input directory");
        return Ok(());
    }

    let staged = stage_images(&images, &args.out)?;
    ingest_span.finish(None);
    info!(count = staged.len(), "staged images to preprocessed/");

    let preprocessed_dir = args.out.join("preprocessed");

    let span = StageSpan::start(PipelineStage::Synthesize);
    let start = Instant::now();
    let pdf_path = build_pdf(&preprocessed_dir, &args.out, config.ocr.pdf_timeout())?;
    span.finish(None);
    info!(path = %pdf_path.display(), elapsed = ?start.elapsed(), "PDF built");

    let span = StageSpan::start(PipelineStage::Ocr);
    let start = Instant::now();
    let ocr_path = ocr_pdf(&pdf_path, &args.out, &config.ocr.lang, config.ocr.ocr_timeout())?;
    span.finish(None);
    info!(path = %ocr_path.display(), elapsed = ?start.elapsed(), "OCR completed");

    if !config.ingest.keep_artifacts {
        if let Err(err) = cleanup_artifact(&pdf_path) {
            warn!(%err, "failed to clean up combined.pdf");
        }
    }

    let span = StageSpan::start(PipelineStage::Extract);
    let start = Instant::now();
    let text_path = extract_text(&ocr_path, &args.out, config.ocr.extract_timeout())?;
    span.finish(None);
    info!(path = %text_path.display(), elapsed = ?start.elapsed(), "text extracted");

    if !config.ingest.keep_artifacts {
        if let Err(err) = cleanup_artifact(&ocr_path) {
            warn!(%err, "failed to clean up combined_ocr.pdf");
        }
    }

    let opts = config.distill_options();
    let summary = distill_to_dir(&text_path, &args.out, images.len(), &opts)?;
    info!(
        input = summary.stats.input_count,
        kept = summary.stats.kept_count,
        exact = summary.stats.exact_dups,
        near = summary.stats.near_dups,
        "deduplication finished"
    );
    info!(path = %summary.markdown_path.display(), "pipeline completed successfully");

    Ok(())
}
