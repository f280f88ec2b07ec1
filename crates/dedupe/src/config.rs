//! Configuration for the deduplication stage.
//!
//! Out-of-range values are coerced back to defaults rather than rejected:
//! deduplication is a batch transform and a bad knob should degrade to the
//! default behavior, not abort the run.

use serde::{Deserialize, Serialize};

/// Deduplication method selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Exact-hash deduplication only.
    Exact,
    /// Exact-hash pre-pass, then SimHash near-duplicate detection on the
    /// survivors.
    Simhash,
    /// Exact and SimHash run independently on the original input; a chunk
    /// is kept only if both methods keep it.
    Both,
}

impl Method {
    /// Parse a method name, falling back to [`Method::Simhash`] for anything
    /// unrecognized.
    pub fn parse_or_default(name: &str) -> Self {
        match name {
            "exact" => Method::Exact,
            "simhash" => Method::Simhash,
            "both" => Method::Both,
            _ => Method::Simhash,
        }
    }

    /// Canonical lowercase name, as it appears in reports and config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Exact => "exact",
            Method::Simhash => "simhash",
            Method::Both => "both",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplication configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupeConfig {
    /// Which deduplication method to run.
    pub method: Method,
    /// Character k-gram size for SimHash signatures.
    pub simhash_k: usize,
    /// Maximum Hamming distance that still counts as a near-duplicate match.
    pub simhash_threshold: u32,
    /// Sliding window size for near-duplicate comparison; 0 compares against
    /// every kept chunk.
    pub window: usize,
}

impl DedupeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_simhash_k(mut self, k: usize) -> Self {
        self.simhash_k = k;
        self
    }

    pub fn with_simhash_threshold(mut self, threshold: u32) -> Self {
        self.simhash_threshold = threshold;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Return a copy with out-of-range values coerced to defaults:
    /// `simhash_k` must be >= 1 and `simhash_threshold` is capped at 64.
    pub fn validated(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.simhash_k == 0 {
            cfg.simhash_k = 5;
        }
        if cfg.simhash_threshold > 64 {
            cfg.simhash_threshold = 64;
        }
        cfg
    }
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            method: Method::Simhash,
            simhash_k: 5,
            simhash_threshold: 6,
            window: 250,
        }
    }
}
