// src/analyze/normalize.rs
//! Text normalization: lowercase + trim for phrase tests, whitespace tokens for the scan.

/// Characters stripped from token edges before lexicon lookups.
pub const EDGE_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '"', '(', ')', '[', ']', '{', '}',
];

/// Normalized view of one input text.
///
/// `text` keeps punctuation so phrase tiers can match things like `"top!"`;
/// `tokens` are the raw whitespace-separated pieces of `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub tokens: Vec<String>,
}

impl Normalized {
    pub fn new(raw: &str) -> Self {
        // Unicode-aware lowercase so diacritics (efficiënt) compare equal.
        let text = raw.trim().to_lowercase();
        let tokens = text.split_whitespace().map(str::to_string).collect();
        Self { text, tokens }
    }

    /// Plain substring containment on the whole normalized text.
    #[inline]
    pub fn contains(&self, pattern: &str) -> bool {
        self.text.contains(pattern)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Strip edge punctuation to obtain the lexicon lookup key of a token.
#[inline]
pub fn lookup_key(token: &str) -> &str {
    token.trim_matches(EDGE_PUNCTUATION)
}
