//! Text similarity between free-text descriptions
//!
//! Scores two strings in the range 0.0-1.0:
//! - identical (case-insensitive, trimmed) text scores 1.0
//! - one containing the other scores 0.8
//! - otherwise the Dice coefficient over distinct lowercase words,
//!   `2 * |common| / (|a| + |b|)`

use std::collections::HashSet;

/// Score awarded when one description contains the other
pub const CONTAINMENT_SCORE: f64 = 0.8;

/// Similarity of two descriptions, 0.0-1.0
///
/// Empty input on either side scores 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a == b {
        return 1.0;
    }

    if a.contains(&b) || b.contains(&a) {
        return CONTAINMENT_SCORE;
    }

    word_overlap(&a, &b)
}

/// Dice coefficient over distinct whitespace-separated words
pub fn word_overlap(a: &str, b: &str) -> f64 {
    let words_a = words(a);
    let words_b = words(b);

    let total = words_a.len() + words_b.len();
    if total == 0 {
        return 0.0;
    }

    let common = words_a.intersection(&words_b).count();
    (2 * common) as f64 / total as f64
}

fn words(s: &str) -> HashSet<String> {
    s.split_whitespace().map(|w| w.to_lowercase()).collect()
}
