// src/analyze/trace.rs
//! Per-stage trace events and the dev-log gate. Raw text is never logged.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use tracing::debug;

/// Short anonymized id of a text: hex of the first 6 bytes of its SHA-256.
pub fn anon_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Dev logging gate: SENTIMENT_DEV_LOG=1 AND dev env
/// (debug build or SHUTTLE_ENV in {local, development, dev}).
pub fn dev_logging_enabled() -> bool {
    let on = std::env::var("SENTIMENT_DEV_LOG").ok().as_deref() == Some("1");
    on && is_dev_env()
}

pub fn is_dev_env() -> bool {
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// One stage evaluation.
pub(crate) fn stage_event(id: &str, stage: &str, hit: bool, matched: Option<&str>) {
    debug!(
        target: "sentiment",
        %id, stage, hit,
        matched = matched.unwrap_or("")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_stable_hex() {
        let a = anon_hash("de lessen zijn slecht");
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, anon_hash("de lessen zijn slecht"));
        assert_ne!(a, anon_hash("de lessen zijn goed"));
    }
}
