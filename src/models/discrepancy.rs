//! Discrepancy model
//!
//! Advisory anomalies surfaced for human review. Discrepancies never mutate
//! transactions or ledger entries; they only reference them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{LedgerEntryId, MatchId, TransactionId};
use super::money::Money;

/// Kind of anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    AmountMismatch,
    DateMismatch,
    MissingEntry,
    Duplicate,
}

impl DiscrepancyKind {
    /// Identifier as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmountMismatch => "amount_mismatch",
            Self::DateMismatch => "date_mismatch",
            Self::MissingEntry => "missing_entry",
            Self::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How urgently a discrepancy needs review
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A flagged anomaly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// Kind of anomaly
    pub kind: DiscrepancyKind,

    /// Severity
    pub severity: Severity,

    /// Offending transaction, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,

    /// Offending ledger entry, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_entry_id: Option<LedgerEntryId>,

    /// Offending match, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<MatchId>,

    /// All transactions in a duplicate cluster
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_transactions: Vec<TransactionId>,

    /// Amount involved (the difference for mismatches, the shared amount for duplicates)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,

    /// Date involved (the shared date for duplicates)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// What is wrong
    pub description: String,

    /// What a reviewer should do about it
    pub suggested_action: String,

    /// Whether a reviewer has actioned this
    #[serde(default)]
    pub resolved: bool,

    /// Who resolved it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,

    /// When it was resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Discrepancy {
    /// Create an unresolved discrepancy with no references
    pub fn new(
        kind: DiscrepancyKind,
        severity: Severity,
        description: impl Into<String>,
        suggested_action: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            transaction_id: None,
            ledger_entry_id: None,
            match_id: None,
            related_transactions: Vec::new(),
            amount: None,
            date: None,
            description: description.into(),
            suggested_action: suggested_action.into(),
            resolved: false,
            resolved_by: None,
            resolved_at: None,
        }
    }

    pub fn with_transaction(mut self, id: TransactionId) -> Self {
        self.transaction_id = Some(id);
        self
    }

    pub fn with_ledger_entry(mut self, id: LedgerEntryId) -> Self {
        self.ledger_entry_id = Some(id);
        self
    }

    pub fn with_match(mut self, id: MatchId) -> Self {
        self.match_id = Some(id);
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Mark as resolved by an external reviewer
    pub fn resolve(&mut self, resolved_by: impl Into<String>, resolved_at: DateTime<Utc>) {
        self.resolved = true;
        self.resolved_by = Some(resolved_by.into());
        self.resolved_at = Some(resolved_at);
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.kind, self.description)
    }
}
