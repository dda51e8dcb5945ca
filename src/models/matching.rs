//! Reconciliation match model
//!
//! An accepted pairing of one bank transaction with one ledger entry.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{MatchId, RuleId};
use super::ledger::LedgerEntry;
use super::transaction::Transaction;

/// How a match was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MatchMethod {
    /// A configured rule paired the two sides
    Rule { rule_id: RuleId },
    /// Fuzzy scoring fallback
    Fuzzy,
}

impl MatchMethod {
    /// Check if this match came from a rule
    pub fn is_rule(&self) -> bool {
        matches!(self, Self::Rule { .. })
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule { .. } => write!(f, "rule"),
            Self::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// A transaction paired with exactly one ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationMatch {
    /// Unique identifier
    pub id: MatchId,

    /// The bank side
    pub transaction: Transaction,

    /// The ledger side
    pub ledger_entry: LedgerEntry,

    /// Confidence score, 0-100
    pub confidence: u8,

    /// Human-readable reason (rule name or fuzzy summary)
    pub reason: String,

    /// Rule-driven or fuzzy-driven
    pub method: MatchMethod,
}

impl ReconciliationMatch {
    /// Create a new match
    pub fn new(
        transaction: Transaction,
        ledger_entry: LedgerEntry,
        confidence: u8,
        reason: impl Into<String>,
        method: MatchMethod,
    ) -> Self {
        Self {
            id: MatchId::new(),
            transaction,
            ledger_entry,
            confidence: confidence.min(100),
            reason: reason.into(),
            method,
        }
    }

    /// Absolute difference between the two amounts' magnitudes
    pub fn amount_difference(&self) -> super::Money {
        self.transaction.amount.abs_diff(self.ledger_entry.magnitude())
    }

    /// Absolute distance between the two dates, in days
    pub fn date_distance_days(&self) -> i64 {
        (self.transaction.date - self.ledger_entry.date).num_days().abs()
    }
}

impl fmt::Display for ReconciliationMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <-> {} [{}% {}: {}]",
            self.transaction.id, self.ledger_entry.id, self.confidence, self.method, self.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryDirection, Money};
    use chrono::NaiveDate;

    #[test]
    fn test_differences() {
        let txn = Transaction::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            "Invoice 42",
            Money::from_cents(10000),
        );
        let entry = LedgerEntry::new(
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            "Invoice 42",
            Money::from_cents(-10250),
            EntryDirection::Credit,
            "Receivables",
        );
        let m = ReconciliationMatch::new(txn, entry, 150, "test", MatchMethod::Fuzzy);

        assert_eq!(m.confidence, 100);
        assert_eq!(m.amount_difference().cents(), 250);
        assert_eq!(m.date_distance_days(), 10);
        assert!(!m.method.is_rule());
    }

    #[test]
    fn test_method_serialization() {
        let method = MatchMethod::Rule { rule_id: RuleId::new() };
        let json = serde_json::to_value(method).unwrap();
        assert_eq!(json["kind"], "rule");
        assert!(json["rule_id"].is_string());
    }
}
