// src/analyze/reload.rs
//! Thread-safe classifier handle with whole-table swap.
//!
//! Readers clone the inner `Arc<Classifier>` and classify without holding the
//! lock; `replace` installs a freshly built classifier atomically. Tables are
//! never mutated in place.

use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

use super::trace::is_dev_env;
use super::{Classification, Classifier, Explanation};
use crate::config::SentimentConfig;

#[derive(Clone, Debug)]
pub struct ClassifierHandle {
    inner: Arc<RwLock<Arc<Classifier>>>,
}

impl ClassifierHandle {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(classifier))),
        }
    }

    pub fn from_config(cfg: &SentimentConfig) -> anyhow::Result<Self> {
        Ok(Self::new(Classifier::from_config(cfg)?))
    }

    /// Snapshot of the active classifier.
    pub fn current(&self) -> Arc<Classifier> {
        // A poisoned lock still holds a fully built classifier.
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, classifier: Classifier) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(classifier);
    }

    pub fn analyze(&self, text: &str) -> Classification {
        self.current().classify(text)
    }

    pub fn explain(&self, text: &str) -> Explanation {
        self.current().explain(text)
    }
}

/// Hot reload is opt-in (SENTIMENT_HOT_RELOAD=1) and dev-gated.
fn hot_reload_enabled() -> bool {
    let want = std::env::var("SENTIMENT_HOT_RELOAD")
        .ok()
        .is_some_and(|v| v == "1");
    want && is_dev_env()
}

/// Rebuild from `cfg` (re-reading its rule book) and swap into `handle`.
/// On failure the active classifier stays in place.
pub fn reload_now(handle: &ClassifierHandle, cfg: &SentimentConfig) -> anyhow::Result<()> {
    let fresh = Classifier::from_config(cfg)?;
    handle.replace(fresh);
    Ok(())
}

/// Poll the external rule book's mtime every 2s and swap on change.
/// No-op without an external `rules_path` or when hot reload is disabled.
pub fn start_hot_reload_thread(handle: ClassifierHandle, cfg: SentimentConfig) {
    if !hot_reload_enabled() {
        return;
    }
    let Some(path) = cfg.rules_path.clone() else {
        return;
    };

    thread::spawn(move || {
        let poll = Duration::from_secs(2);
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            if let Some(mtime) = mtime_of(&path) {
                let changed = match last_mtime {
                    None => {
                        last_mtime = Some(mtime);
                        false
                    }
                    Some(prev) => mtime > prev,
                };
                if changed {
                    match reload_now(&handle, &cfg) {
                        Ok(()) => {
                            info!(target: "sentiment", path = %path.display(), "rule book reloaded")
                        }
                        Err(e) => {
                            warn!(target: "sentiment", error = %e, "rule book reload failed; keeping previous")
                        }
                    }
                    last_mtime = Some(mtime);
                }
            }
            thread::sleep(poll);
        }
    });
}

fn mtime_of(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
