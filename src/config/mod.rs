// src/config/mod.rs
pub mod sentiment;

pub use sentiment::SentimentConfig;
