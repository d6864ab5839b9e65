// src/config/sentiment.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::fallback::{
    Thresholds, DEFAULT_NEGATIVE_THRESHOLD, DEFAULT_POSITIVE_THRESHOLD,
};

// --- env defaults & names ---
pub const DEFAULT_SENTIMENT_CONFIG_PATH: &str = "config/sentiment.toml";

pub const ENV_SENTIMENT_CONFIG_PATH: &str = "SENTIMENT_CONFIG_PATH";
pub const ENV_POSITIVE_THRESHOLD: &str = "POSITIVE_THRESHOLD";
pub const ENV_NEGATIVE_THRESHOLD: &str = "NEGATIVE_THRESHOLD";
pub const ENV_RULES_PATH: &str = "SENTIMENT_RULES_PATH";
pub const ENV_TRACE: &str = "SENTIMENT_TRACE";

fn default_positive() -> f64 {
    DEFAULT_POSITIVE_THRESHOLD
}
fn default_negative() -> f64 {
    DEFAULT_NEGATIVE_THRESHOLD
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SentimentConfig {
    #[serde(default = "default_positive")]
    pub positive_threshold: f64,
    #[serde(default = "default_negative")]
    pub negative_threshold: f64,
    /// External rule book (TOML). `None` = built-in Dutch rules.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
    /// Emit per-stage trace events (anonymized) on target `sentiment`.
    #[serde(default)]
    pub trace: bool,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            positive_threshold: DEFAULT_POSITIVE_THRESHOLD,
            negative_threshold: DEFAULT_NEGATIVE_THRESHOLD,
            rules_path: None,
            trace: false,
        }
    }
}

impl SentimentConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: SentimentConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading sentiment config from {}", path.display()))?;
        Self::from_toml_str(&data)
            .with_context(|| format!("parsing sentiment config {}", path.display()))
    }

    /// Resolve configuration:
    /// 1) $SENTIMENT_CONFIG_PATH (must exist)
    /// 2) config/sentiment.toml (optional)
    /// 3) defaults
    ///
    /// then apply env overrides (POSITIVE_THRESHOLD, NEGATIVE_THRESHOLD,
    /// SENTIMENT_RULES_PATH, SENTIMENT_TRACE).
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_SENTIMENT_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_SENTIMENT_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            Self::load_from_file(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_SENTIMENT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from_file(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Some(v) = parse_f64_env(std::env::var(ENV_POSITIVE_THRESHOLD).ok()) {
            self.positive_threshold = v;
        }
        if let Some(v) = parse_f64_env(std::env::var(ENV_NEGATIVE_THRESHOLD).ok()) {
            self.negative_threshold = v;
        }
        if let Ok(p) = std::env::var(ENV_RULES_PATH) {
            if !p.trim().is_empty() {
                self.rules_path = Some(PathBuf::from(p.trim()));
            }
        }
        if std::env::var(ENV_TRACE).ok().as_deref() == Some("1") {
            self.trace = true;
        }
        self.sanitize();
    }

    fn sanitize(&mut self) {
        if !self.positive_threshold.is_finite() {
            self.positive_threshold = DEFAULT_POSITIVE_THRESHOLD;
        }
        if !self.negative_threshold.is_finite() {
            self.negative_threshold = DEFAULT_NEGATIVE_THRESHOLD;
        }
        if self.negative_threshold > self.positive_threshold {
            // swap to keep a valid interval
            std::mem::swap(&mut self.positive_threshold, &mut self.negative_threshold);
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            positive: self.positive_threshold,
            negative: self.negative_threshold,
        }
    }
}

fn parse_f64_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
