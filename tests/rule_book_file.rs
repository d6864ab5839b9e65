// tests/rule_book_file.rs
//
// External rule books: loading from disk, validation errors, and reload swaps
// through the shared handle.

use std::fs;

use feedback_sentiment::analyze::reload::reload_now;
use feedback_sentiment::analyze::rules::{RuleBook, DEFAULT_RULES_TOML};
use feedback_sentiment::{ClassifierHandle, Label, SentimentConfig};

/// Built-in book plus one extra tier evaluated before everything else.
fn book_with_first_tier(pattern: &str) -> String {
    format!(
        r#"{DEFAULT_RULES_TOML}

[[tiers]]
name = "course_specific"
priority = 1
outcome = {{ label = "Positive", score = 0.9, confidence = 0.95 }}
patterns = ["{pattern}"]
"#
    )
}

#[test]
fn builtin_book_shape() {
    let book = RuleBook::builtin().expect("built-in book parses");
    let names: Vec<&str> = book.tiers().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "negated_positive",
            "negated_negative",
            "neutral_indicator",
            "strong_negative",
            "strong_negative_variant",
            "strong_positive",
            "positive_pattern",
            "positive_exclamation",
            "subtle_negative",
            "problem_causing",
        ]
    );
    assert_eq!(book.lexicon.variants().len(), 8);
    assert!(book.lexicon.is_negator("nergens"));
}

#[test]
fn external_book_is_loaded_from_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rules.toml");
    fs::write(&path, book_with_first_tier("niet goed")).expect("write rules");

    let cfg = SentimentConfig {
        rules_path: Some(path),
        ..Default::default()
    };
    let handle = ClassifierHandle::from_config(&cfg).expect("load external book");

    let e = handle.explain("de uitleg is niet goed");
    assert_eq!(e.stage, "course_specific");
    assert_eq!(e.result.label, Label::Positive);
    assert_eq!(e.result.confidence, 0.95);
}

#[test]
fn invalid_books_are_rejected_with_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");

    // duplicate priority with the built-in negated_positive tier
    let dup = DEFAULT_RULES_TOML.to_string()
        + r#"
[[tiers]]
name = "clash"
priority = 10
outcome = { label = "Neutral", score = 0.0, confidence = 0.5 }
patterns = ["x"]
"#;
    fs::write(&path, dup).expect("write rules");
    let err = RuleBook::from_path(&path).expect_err("duplicate priority");
    assert!(format!("{err:#}").contains("duplicate tier priority"));

    // label/score mismatch
    let bad = r#"
[lexicon]
[[tiers]]
name = "odd"
priority = 1
outcome = { label = "Positive", score = -0.4, confidence = 0.5 }
patterns = ["x"]
"#;
    fs::write(&path, bad).expect("write rules");
    let err = RuleBook::from_path(&path).expect_err("inconsistent outcome");
    assert!(format!("{err:#}").contains("inconsistent"));

    // missing file names the path
    let err = RuleBook::from_path(&dir.path().join("absent.toml")).expect_err("missing");
    assert!(format!("{err:#}").contains("absent.toml"));
}

#[test]
fn reload_swaps_tables_and_keeps_old_on_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rules.toml");
    fs::write(&path, DEFAULT_RULES_TOML).expect("write rules");

    let cfg = SentimentConfig {
        rules_path: Some(path.clone()),
        ..Default::default()
    };
    let handle = ClassifierHandle::from_config(&cfg).expect("initial load");
    assert_eq!(handle.analyze("dit vak").label, Label::Neutral);

    fs::write(&path, book_with_first_tier("dit vak")).expect("rewrite rules");
    reload_now(&handle, &cfg).expect("reload");
    assert_eq!(handle.explain("dit vak").stage, "course_specific");

    // a broken file leaves the last good tables active
    fs::write(&path, "[[tiers]]\nname = ").expect("corrupt rules");
    assert!(reload_now(&handle, &cfg).is_err());
    assert_eq!(handle.explain("dit vak").stage, "course_specific");
}
