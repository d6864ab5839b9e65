// src/analyze/lexicon.rs
//! Lexicon store: polarity-tagged words/phrases, modifier sets and the
//! spelling-variant map consulted by the token scan.
//!
//! Built once from the `[lexicon]` table of a rule book and never mutated.

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use super::fuzzy::{fuzzy_match, DEFAULT_FUZZY_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolarityClass {
    StrongNegative,
    Negative,
    Positive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Word,
    Phrase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconEntry {
    pub text: String,
    pub class: PolarityClass,
    pub scope: Scope,
}

/// Canonical form plus its known misspellings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpellingVariant {
    pub canonical: String,
    pub variants: BTreeSet<String>,
}

/// Per-class word lists as they appear in TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassLists {
    #[serde(default)]
    pub strong_negative: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
    #[serde(default)]
    pub positive: Vec<String>,
}

/// `[lexicon]` section of a rule book file.
#[derive(Debug, Clone, Deserialize)]
pub struct LexiconCfg {
    #[serde(default)]
    pub negators: Vec<String>,
    #[serde(default)]
    pub diminishers: Vec<String>,
    #[serde(default)]
    pub intensifiers: Vec<String>,
    #[serde(default)]
    pub negatable_negative: Vec<String>,
    #[serde(default)]
    pub negatable_positive: Vec<String>,
    #[serde(default)]
    pub fuzzy_targets: Vec<String>,
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    #[serde(default)]
    pub words: ClassLists,
    #[serde(default)]
    pub phrases: ClassLists,
    #[serde(default)]
    pub variants: Vec<SpellingVariant>,
}

fn default_fuzzy_threshold() -> f64 {
    DEFAULT_FUZZY_THRESHOLD
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
    /// Word-scope entries by class; a word may sit in several classes.
    words: HashMap<PolarityClass, HashSet<String>>,
    /// Phrase-scope entries split into their keys, longest first.
    phrases: Vec<(Vec<String>, PolarityClass)>,
    negators: HashSet<String>,
    diminishers: HashSet<String>,
    intensifiers: HashSet<String>,
    negatable_negative: HashSet<String>,
    negatable_positive: HashSet<String>,
    fuzzy_targets: Vec<String>,
    fuzzy_threshold: f64,
    /// misspelling -> canonical
    variant_index: HashMap<String, String>,
    variants: Vec<SpellingVariant>,
}

fn set(items: &[String]) -> HashSet<String> {
    items.iter().map(|s| s.trim().to_lowercase()).collect()
}

impl Lexicon {
    pub fn from_cfg(cfg: &LexiconCfg) -> anyhow::Result<Self> {
        if !(0.0..=1.0).contains(&cfg.fuzzy_threshold) {
            anyhow::bail!(
                "lexicon fuzzy_threshold {} outside [0,1]",
                cfg.fuzzy_threshold
            );
        }

        let mut entries = Vec::new();
        for (lists, scope) in [(&cfg.words, Scope::Word), (&cfg.phrases, Scope::Phrase)] {
            for (items, class) in [
                (&lists.strong_negative, PolarityClass::StrongNegative),
                (&lists.negative, PolarityClass::Negative),
                (&lists.positive, PolarityClass::Positive),
            ] {
                for raw in items {
                    let text = raw.trim().to_lowercase();
                    if text.is_empty() {
                        continue;
                    }
                    let multi = text.split_whitespace().count() > 1;
                    match (scope, multi) {
                        (Scope::Word, true) => {
                            anyhow::bail!("lexicon word entry `{text}` contains whitespace")
                        }
                        (Scope::Phrase, false) => {
                            anyhow::bail!("lexicon phrase entry `{text}` is a single word")
                        }
                        _ => {}
                    }
                    entries.push(LexiconEntry { text, class, scope });
                }
            }
        }
        Ok(Self::from_entries(entries, cfg))
    }

    fn from_entries(entries: Vec<LexiconEntry>, cfg: &LexiconCfg) -> Self {
        let mut words: HashMap<PolarityClass, HashSet<String>> = HashMap::new();
        let mut phrases: Vec<(Vec<String>, PolarityClass)> = Vec::new();
        for e in &entries {
            match e.scope {
                Scope::Word => {
                    words.entry(e.class).or_default().insert(e.text.clone());
                }
                Scope::Phrase => {
                    let keys = e.text.split_whitespace().map(str::to_string).collect();
                    phrases.push((keys, e.class));
                }
            }
        }
        phrases.sort_by_key(|(keys, _)| std::cmp::Reverse(keys.len()));

        let mut variant_index = HashMap::new();
        for v in &cfg.variants {
            for form in &v.variants {
                variant_index
                    .entry(form.to_lowercase())
                    .or_insert_with(|| v.canonical.to_lowercase());
            }
        }

        Self {
            entries,
            words,
            phrases,
            negators: set(&cfg.negators),
            diminishers: set(&cfg.diminishers),
            intensifiers: set(&cfg.intensifiers),
            negatable_negative: set(&cfg.negatable_negative),
            negatable_positive: set(&cfg.negatable_positive),
            fuzzy_targets: cfg.fuzzy_targets.iter().map(|s| s.to_lowercase()).collect(),
            fuzzy_threshold: cfg.fuzzy_threshold,
            variant_index,
            variants: cfg.variants.clone(),
        }
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn variants(&self) -> &[SpellingVariant] {
        &self.variants
    }

    pub fn has_class(&self, key: &str, class: PolarityClass) -> bool {
        self.words.get(&class).is_some_and(|s| s.contains(key))
    }

    pub fn is_negator(&self, token: &str) -> bool {
        self.negators.contains(token)
    }

    pub fn is_diminisher(&self, token: &str) -> bool {
        self.diminishers.contains(token)
    }

    pub fn is_intensifier(&self, key: &str) -> bool {
        self.intensifiers.contains(key)
    }

    pub fn is_negatable_negative(&self, key: &str) -> bool {
        self.negatable_negative.contains(key)
    }

    pub fn is_negatable_positive(&self, key: &str) -> bool {
        self.negatable_positive.contains(key)
    }

    /// Exact lookup in the spelling-variant map: misspelling -> canonical.
    pub fn canonical_for(&self, key: &str) -> Option<&str> {
        self.variant_index.get(key).map(String::as_str)
    }

    /// Resolve a misspelled strong-negative word: exact variant map first,
    /// then fuzzy comparison against the fuzzy targets.
    pub fn misspelled_strong_negative(&self, key: &str) -> Option<&str> {
        if let Some(canonical) = self.canonical_for(key) {
            if self.has_class(canonical, PolarityClass::StrongNegative) {
                return Some(canonical);
            }
        }
        fuzzy_match(key, &self.fuzzy_targets, self.fuzzy_threshold)
    }

    /// Phrase-scope entry ending at `keys.last()`, if any (longest wins).
    pub fn phrase_ending_at(&self, keys: &[&str]) -> Option<PolarityClass> {
        self.phrases.iter().find_map(|(phrase, class)| {
            let n = phrase.len();
            (n <= keys.len() && keys[keys.len() - n..].iter().zip(phrase).all(|(a, b)| a == b))
                .then_some(*class)
        })
    }
}
