//! YAML configuration file support for pagesift.
//!
//! All pipeline knobs can be set in a single YAML file and loaded at
//! runtime; CLI flags override individual values. Unknown or out-of-range
//! dedup values never abort a run — they degrade to defaults when the
//! configuration is converted into stage options.
//!
//! ## Example
//!
//! ```yaml
//! version: "1.0"
//!
//! ingest:
//!   recursive: true
//!   keep_artifacts: true
//!
//! ocr:
//!   lang: "eng"
//!   pdf_timeout_secs: 300
//!   ocr_timeout_secs: 600
//!   extract_timeout_secs: 120
//!
//! chunk:
//!   min_chunk_chars: 60
//!   emit_chunks_jsonl: true
//!
//! chrome:
//!   max_length: 100
//!   extra_patterns:
//!     - "page \\d+ of \\d+"
//!
//! dedupe:
//!   method: "simhash"
//!   simhash_k: 5
//!   simhash_threshold: 6
//!   window: 250
//!
//! render:
//!   markdown_title: "Extracted Notes"
//!   include_chunk_ids: false
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dedupe::Method;
use textseg::default_chrome_patterns;

use crate::DistillOptions;

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),
    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PagesiftConfig {
    /// Configuration format version.
    #[serde(default = "default_config_version")]
    pub version: String,

    #[serde(default)]
    pub ingest: IngestSection,

    #[serde(default)]
    pub ocr: OcrSection,

    #[serde(default)]
    pub chunk: ChunkSection,

    #[serde(default)]
    pub chrome: ChromeSection,

    #[serde(default)]
    pub dedupe: DedupeSection,

    #[serde(default)]
    pub render: RenderSection,
}

impl PagesiftConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PagesiftConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }
    }

    /// Flatten into the options consumed by the chunk-and-dedup core. The
    /// chrome pattern list is the default set plus any extra patterns.
    pub fn distill_options(&self) -> DistillOptions {
        let mut patterns = default_chrome_patterns();
        patterns.extend(self.chrome.extra_patterns.iter().cloned());

        DistillOptions {
            min_chunk_chars: self.chunk.min_chunk_chars,
            chrome_patterns: patterns,
            chrome_max_length: self.chrome.max_length,
            dedupe: dedupe::DedupeConfig {
                method: Method::parse_or_default(&self.dedupe.method),
                simhash_k: self.dedupe.simhash_k,
                simhash_threshold: self.dedupe.simhash_threshold,
                window: self.dedupe.window,
            }
            .validated(),
            markdown_title: self.render.markdown_title.clone(),
            include_chunk_ids: self.render.include_chunk_ids,
            emit_chunks_jsonl: self.chunk.emit_chunks_jsonl,
        }
    }
}

impl Default for PagesiftConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            ingest: IngestSection::default(),
            ocr: OcrSection::default(),
            chunk: ChunkSection::default(),
            chrome: ChromeSection::default(),
            dedupe: DedupeSection::default(),
            render: RenderSection::default(),
        }
    }
}

/// Image enumeration and artifact retention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSection {
    #[serde(default = "true_value")]
    pub recursive: bool,
    #[serde(default = "true_value")]
    pub keep_artifacts: bool,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            recursive: true,
            keep_artifacts: true,
        }
    }
}

/// External OCR toolchain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSection {
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_pdf_timeout")]
    pub pdf_timeout_secs: u64,
    #[serde(default = "default_ocr_timeout")]
    pub ocr_timeout_secs: u64,
    #[serde(default = "default_extract_timeout")]
    pub extract_timeout_secs: u64,
}

impl OcrSection {
    pub fn pdf_timeout(&self) -> Duration {
        Duration::from_secs(self.pdf_timeout_secs)
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }

    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs)
    }
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            pdf_timeout_secs: default_pdf_timeout(),
            ocr_timeout_secs: default_ocr_timeout(),
            extract_timeout_secs: default_extract_timeout(),
        }
    }
}

/// Chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSection {
    #[serde(default = "default_min_chunk_chars")]
    pub min_chunk_chars: usize,
    #[serde(default = "true_value")]
    pub emit_chunks_jsonl: bool,
}

impl Default for ChunkSection {
    fn default() -> Self {
        Self {
            min_chunk_chars: default_min_chunk_chars(),
            emit_chunks_jsonl: true,
        }
    }
}

/// Chrome filter settings. `extra_patterns` are appended to the built-in
/// set, never replacing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChromeSection {
    #[serde(default)]
    pub extra_patterns: Vec<String>,
    #[serde(default = "default_chrome_max_length")]
    pub max_length: usize,
}

/// Deduplication settings. The method is a free string here so that a typo
/// degrades to the default method instead of failing the parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupeSection {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_simhash_k")]
    pub simhash_k: usize,
    #[serde(default = "default_simhash_threshold")]
    pub simhash_threshold: u32,
    #[serde(default = "default_window")]
    pub window: usize,
}

impl Default for DedupeSection {
    fn default() -> Self {
        Self {
            method: default_method(),
            simhash_k: default_simhash_k(),
            simhash_threshold: default_simhash_threshold(),
            window: default_window(),
        }
    }
}

/// Markdown rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSection {
    #[serde(default = "default_markdown_title")]
    pub markdown_title: String,
    #[serde(default)]
    pub include_chunk_ids: bool,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            markdown_title: default_markdown_title(),
            include_chunk_ids: false,
        }
    }
}

fn default_config_version() -> String {
    "1.0".to_string()
}
fn true_value() -> bool {
    true
}
fn default_lang() -> String {
    "eng".to_string()
}
fn default_pdf_timeout() -> u64 {
    300
}
fn default_ocr_timeout() -> u64 {
    600
}
fn default_extract_timeout() -> u64 {
    120
}
fn default_min_chunk_chars() -> usize {
    60
}
fn default_chrome_max_length() -> usize {
    100
}
fn default_method() -> String {
    "simhash".to_string()
}
fn default_markdown_title() -> String {
    "Extracted Notes".to_string()
}
fn default_simhash_k() -> usize {
    5
}
fn default_simhash_threshold() -> u32 {
    6
}
fn default_window() -> usize {
    250
}

impl Default for ChromeSection {
    fn default() -> Self {
        Self {
            extra_patterns: Vec::new(),
            max_length: default_chrome_max_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_valid_yaml() {
        let yaml = r#"
version: "1.0"
chunk:
  min_chunk_chars: 40
dedupe:
  method: "both"
  window: 10
"#;
        let config = PagesiftConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.chunk.min_chunk_chars, 40);
        assert_eq!(config.dedupe.method, "both");
        assert_eq!(config.dedupe.window, 10);
        // Untouched sections keep defaults.
        assert_eq!(config.ocr.lang, "eng");
        assert_eq!(config.dedupe.simhash_k, 5);
    }

    #[test]
    fn load_from_file() {
        let yaml = "version: \"1.0\"\n";
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = PagesiftConfig::from_file(file.path()).unwrap();
        assert_eq!(config.version, "1.0");
    }

    #[test]
    fn unsupported_version_rejected() {
        let result = PagesiftConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(result, Err(ConfigLoadError::UnsupportedVersion(_))));
    }

    #[test]
    fn defaults_match_spec() {
        let config = PagesiftConfig::default();
        assert_eq!(config.chunk.min_chunk_chars, 60);
        assert_eq!(config.chrome.max_length, 100);
        assert_eq!(config.dedupe.method, "simhash");
        assert_eq!(config.dedupe.simhash_k, 5);
        assert_eq!(config.dedupe.simhash_threshold, 6);
        assert_eq!(config.dedupe.window, 250);
        assert_eq!(config.render.markdown_title, "Extracted Notes");
        assert!(!config.render.include_chunk_ids);
        assert!(config.chunk.emit_chunks_jsonl);
    }

    #[test]
    fn distill_options_appends_extra_patterns() {
        let yaml = r#"
version: "1.0"
chrome:
  extra_patterns:
    - "page \\d+ of \\d+"
"#;
        let config = PagesiftConfig::from_yaml(yaml).unwrap();
        let opts = config.distill_options();
        assert_eq!(
            opts.chrome_patterns.len(),
            default_chrome_patterns().len() + 1
        );
        assert!(opts.chrome_patterns.contains(&"page \\d+ of \\d+".to_string()));
    }

    #[test]
    fn unknown_method_degrades_to_simhash() {
        let yaml = r#"
version: "1.0"
dedupe:
  method: "fuzzy"
"#;
        let config = PagesiftConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.distill_options().dedupe.method, Method::Simhash);
    }

    #[test]
    fn out_of_range_values_clamped_in_options() {
        let yaml = r#"
version: "1.0"
dedupe:
  simhash_k: 0
  simhash_threshold: 999
"#;
        let config = PagesiftConfig::from_yaml(yaml).unwrap();
        let opts = config.distill_options();
        assert_eq!(opts.dedupe.simhash_k, 5);
        assert_eq!(opts.dedupe.simhash_threshold, 64);
    }

    #[test]
    fn full_yaml_roundtrip() {
        let yaml = r#"
version: "1.0"
ingest:
  recursive: false
  keep_artifacts: false
ocr:
  lang: "deu"
  ocr_timeout_secs: 60
chunk:
  min_chunk_chars: 30
  emit_chunks_jsonl: false
chrome:
  max_length: 80
dedupe:
  method: "exact"
render:
  markdown_title: "Scans"
  include_chunk_ids: true
"#;
        let config = PagesiftConfig::from_yaml(yaml).unwrap();
        assert!(!config.ingest.recursive);
        assert!(!config.ingest.keep_artifacts);
        assert_eq!(config.ocr.lang, "deu");
        assert_eq!(config.ocr.ocr_timeout(), Duration::from_secs(60));
        assert_eq!(config.chunk.min_chunk_chars, 30);
        assert_eq!(config.chrome.max_length, 80);
        let opts = config.distill_options();
        assert_eq!(opts.dedupe.method, Method::Exact);
        assert_eq!(opts.markdown_title, "Scans");
        assert!(opts.include_chunk_ids);
        assert!(!opts.emit_chunks_jsonl);
    }
}
