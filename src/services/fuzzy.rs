//! Fuzzy confidence scoring
//!
//! Scores a (transaction, ledger entry) pair out of 100 from three
//! independently capped components:
//!
//! | Component   | Points                                              |
//! |-------------|-----------------------------------------------------|
//! | amount      | 40 within one cent, 20 under 5% relative difference |
//! | date        | 30 same day, 20 within 3 days, 10 within 7 days     |
//! | description | 30 x text similarity                                |

use serde::Serialize;

use super::similarity::similarity;
use crate::models::{LedgerEntry, Transaction};

pub const AMOUNT_EXACT_POINTS: u8 = 40;
pub const AMOUNT_CLOSE_POINTS: u8 = 20;
pub const DESCRIPTION_POINTS: f64 = 30.0;

/// Relative amount difference below which partial amount points are given
const AMOUNT_CLOSE_RATIO: f64 = 0.05;

/// Component scores for one candidate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuzzyScore {
    pub amount: u8,
    pub date: u8,
    pub description: f64,
}

impl FuzzyScore {
    /// Rounded total, 0-100
    pub fn total(&self) -> u8 {
        let sum = f64::from(self.amount) + f64::from(self.date) + self.description;
        sum.round().clamp(0.0, 100.0) as u8
    }

    /// Short human-readable breakdown used as a match reason
    pub fn summary(&self) -> String {
        format!(
            "fuzzy: amount {}/40, date {}/30, description {:.0}/30",
            self.amount, self.date, self.description
        )
    }
}

/// Fallback scorer for pairs no rule claimed
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyMatcher;

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Score each component for the pair
    pub fn score(&self, transaction: &Transaction, entry: &LedgerEntry) -> FuzzyScore {
        FuzzyScore {
            amount: amount_points(transaction, entry),
            date: date_points((transaction.date - entry.date).num_days().abs()),
            description: DESCRIPTION_POINTS
                * similarity(&transaction.description, &entry.description),
        }
    }

    /// Confidence for the pair, 0-100
    pub fn confidence(&self, transaction: &Transaction, entry: &LedgerEntry) -> u8 {
        self.score(transaction, entry).total()
    }
}

/// Confidence of a rule-driven match: fuzzy confidence plus a priority bonus
///
/// Clamped to 0-100; negative priorities can lower the score.
pub fn rule_confidence(fuzzy: u8, priority: i32, weight: u32) -> u8 {
    let adjusted = i64::from(fuzzy) + i64::from(priority) * i64::from(weight);
    adjusted.clamp(0, 100) as u8
}

fn amount_points(transaction: &Transaction, entry: &LedgerEntry) -> u8 {
    let bank = transaction.amount;
    let ledger = entry.magnitude();
    let diff = bank.abs_diff(ledger).cents();

    if diff <= 1 {
        return AMOUNT_EXACT_POINTS;
    }

    let larger = bank.cents().abs().max(ledger.cents().abs());
    if (diff as f64) / (larger as f64) < AMOUNT_CLOSE_RATIO {
        AMOUNT_CLOSE_POINTS
    } else {
        0
    }
}

fn date_points(days_apart: i64) -> u8 {
    match days_apart {
        0 => 30,
        1..=3 => 20,
        4..=7 => 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryDirection, Money};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(cents: i64, day: u32, desc: &str) -> Transaction {
        Transaction::new(date(2024, 2, day), desc, Money::from_cents(cents))
    }

    fn entry(cents: i64, day: u32, desc: &str) -> LedgerEntry {
        LedgerEntry::new(
            date(2024, 2, day),
            desc,
            Money::from_cents(cents),
            EntryDirection::Credit,
            "Operating",
        )
    }

    #[test]
    fn test_identical_pair_scores_full() {
        let m = FuzzyMatcher::new();
        assert_eq!(m.confidence(&txn(500000, 1, "Rent"), &entry(500000, 1, "Rent")), 100);
    }

    #[test]
    fn test_amount_components() {
        let m = FuzzyMatcher::new();
        // one cent apart still counts as exact
        assert_eq!(m.score(&txn(10000, 1, ""), &entry(10001, 1, "")).amount, 40);
        // 4% apart
        assert_eq!(m.score(&txn(10000, 1, ""), &entry(10400, 1, "")).amount, 20);
        // 6% apart
        assert_eq!(m.score(&txn(10000, 1, ""), &entry(10600, 1, "")).amount, 0);
        // signs are ignored
        assert_eq!(m.score(&txn(-10000, 1, ""), &entry(10000, 1, "")).amount, 40);
    }

    #[test]
    fn test_date_components() {
        assert_eq!(date_points(0), 30);
        assert_eq!(date_points(3), 20);
        assert_eq!(date_points(4), 10);
        assert_eq!(date_points(7), 10);
        assert_eq!(date_points(8), 0);
    }

    #[test]
    fn test_threshold_neighbours() {
        let m = FuzzyMatcher::new();
        assert_eq!(m.confidence(&txn(2500, 10, "alpha"), &entry(2500, 10, "omega")), 70);
        assert_eq!(
            m.confidence(
                &txn(2500, 10, "alpha beta gamma"),
                &entry(2500, 12, "alpha delta epsilon zeta")
            ),
            69
        );
    }

    #[test]
    fn test_rule_confidence_clamped() {
        assert_eq!(rule_confidence(60, 3, 5), 75);
        assert_eq!(rule_confidence(90, 100, 5), 100);
        assert_eq!(rule_confidence(10, -10, 5), 0);
    }

    #[test]
    fn test_summary_mentions_components() {
        let score = FuzzyMatcher::new().score(&txn(100, 1, "a"), &entry(100, 1, "a"));
        assert_eq!(score.summary(), "fuzzy: amount 40/40, date 30/30, description 30/30");
    }
}
