// src/analyze/rules.rs
//! Rule book: the ordered phrase tiers plus the lexicon, loaded from TOML.
//!
//! File shape (see `lexicon/nl.toml` for the built-in Dutch book):
//! ```toml
//! [lexicon]            # see `lexicon::LexiconCfg`
//! negators = ["niet"]
//!
//! [[tiers]]
//! name = "negated_positive"
//! priority = 10                         # lower = evaluated first
//! outcome = { label = "Negative", score = -0.7, confidence = 0.8 }
//! patterns = ["niet goed", "niet leuk"] # substring tests on the normalized text
//!
//! [[tiers]]
//! name = "strong_negative_variant"
//! priority = 50
//! outcome = { label = "Negative", score = -0.8, confidence = 0.9 }
//! [[tiers.variants]]                    # misspellings of a canonical trigger
//! canonical = "racist"
//! variants = ["rassist", "rasist"]
//! ```
//!
//! Within a tier the outcome does not depend on which pattern matched; the
//! first tier (by priority) with any hit decides.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::lexicon::{Lexicon, LexiconCfg, SpellingVariant};
use super::normalize::Normalized;
use super::{Classification, Label};

/// Built-in Dutch rule book.
pub const DEFAULT_RULES_TOML: &str = include_str!("../../lexicon/nl.toml");

/// How a phrase tier tests the text. Both kinds are substring tests; the
/// token scan is not a tier and always runs after them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierKind {
    /// Any listed phrase.
    PhraseMembership,
    /// Any known misspelling of a canonical trigger.
    SpellingVariant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TierCfg {
    pub name: String,
    pub priority: u32,
    pub outcome: Classification,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub variants: Vec<SpellingVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleBookCfg {
    pub lexicon: LexiconCfg,
    #[serde(default)]
    pub tiers: Vec<TierCfg>,
}

/// One compiled phrase tier.
#[derive(Debug, Clone)]
pub struct RuleTier {
    pub name: String,
    pub priority: u32,
    pub kind: TierKind,
    /// Lowercased patterns in file order. For variant tiers: `(form, canonical)`.
    patterns: Vec<(String, Option<String>)>,
    pub outcome: Classification,
}

/// What a phrase tier matched.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseHit {
    pub pattern: String,
    pub canonical: Option<String>,
}

impl RuleTier {
    fn compile(cfg: TierCfg) -> anyhow::Result<Self> {
        let (kind, patterns) = match (cfg.patterns.is_empty(), cfg.variants.is_empty()) {
            (false, true) => (
                TierKind::PhraseMembership,
                cfg.patterns
                    .iter()
                    .map(|p| (p.to_lowercase(), None))
                    .collect::<Vec<_>>(),
            ),
            (true, false) => (
                TierKind::SpellingVariant,
                cfg.variants
                    .iter()
                    .flat_map(|v| {
                        v.variants
                            .iter()
                            .map(move |form| (form.to_lowercase(), Some(v.canonical.clone())))
                    })
                    .collect(),
            ),
            (true, true) => anyhow::bail!("tier `{}` has no patterns", cfg.name),
            (false, false) => {
                anyhow::bail!("tier `{}` mixes patterns and variants", cfg.name)
            }
        };
        if patterns.iter().any(|(p, _)| p.trim().is_empty()) {
            anyhow::bail!("tier `{}` contains an empty pattern", cfg.name);
        }
        validate_outcome(&cfg.name, &cfg.outcome)?;

        Ok(Self {
            name: cfg.name,
            priority: cfg.priority,
            kind,
            patterns,
            outcome: cfg.outcome,
        })
    }

    /// First pattern (in list order) contained in the normalized text.
    pub fn first_hit(&self, text: &Normalized) -> Option<PhraseHit> {
        self.patterns
            .iter()
            .find(|(p, _)| text.contains(p))
            .map(|(p, canonical)| PhraseHit {
                pattern: p.clone(),
                canonical: canonical.clone(),
            })
    }
}

fn validate_outcome(tier: &str, o: &Classification) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&o.confidence) {
        anyhow::bail!("tier `{tier}` confidence {} outside [0,1]", o.confidence);
    }
    let consistent = match o.label {
        Label::Negative => o.score < 0.0,
        Label::Positive => o.score > 0.0,
        Label::Neutral => o.score == 0.0,
    };
    if !consistent {
        anyhow::bail!(
            "tier `{tier}` score {} inconsistent with label {:?}",
            o.score,
            o.label
        );
    }
    Ok(())
}

/// Immutable, validated rule tables. Build once, share behind `Arc`.
#[derive(Debug, Clone)]
pub struct RuleBook {
    pub lexicon: Lexicon,
    tiers: Vec<RuleTier>,
}

impl RuleBook {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let cfg: RuleBookCfg = toml::from_str(s)?;
        Self::from_cfg(cfg)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read rule book at {}: {}", path.display(), e)
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("rule book {}: {}", path.display(), e))
    }

    pub fn from_cfg(cfg: RuleBookCfg) -> anyhow::Result<Self> {
        let lexicon = Lexicon::from_cfg(&cfg.lexicon)?;

        let mut seen = HashSet::new();
        for t in &cfg.tiers {
            if !seen.insert(t.priority) {
                anyhow::bail!("duplicate tier priority {} (`{}`)", t.priority, t.name);
            }
        }

        let mut tiers = cfg
            .tiers
            .into_iter()
            .map(RuleTier::compile)
            .collect::<anyhow::Result<Vec<_>>>()?;
        tiers.sort_by_key(|t| t.priority);

        Ok(Self { lexicon, tiers })
    }

    /// The built-in Dutch rule book.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_toml_str(DEFAULT_RULES_TOML)
    }

    /// Phrase tiers in evaluation order.
    pub fn tiers(&self) -> &[RuleTier] {
        &self.tiers
    }
}
