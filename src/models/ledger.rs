//! Ledger entry model
//!
//! Internally recorded accounting movements supplied by the host ledger.
//! This crate only ever reads them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::LedgerEntryId;
use super::money::Money;

/// Debit or credit side of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    #[default]
    Debit,
    Credit,
}

impl fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debit => write!(f, "Debit"),
            Self::Credit => write!(f, "Credit"),
        }
    }
}

/// An internally recorded ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier
    pub id: LedgerEntryId,

    /// Entry date
    pub date: NaiveDate,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Signed amount
    pub amount: Money,

    /// Debit or credit
    #[serde(default)]
    pub direction: EntryDirection,

    /// Account label in the host ledger
    #[serde(default)]
    pub account: String,

    /// Optional reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Optional source tag (e.g. "invoice", "payroll")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl LedgerEntry {
    /// Create a new ledger entry
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Money,
        direction: EntryDirection,
        account: impl Into<String>,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            date,
            description: description.into(),
            amount,
            direction,
            account: account.into(),
            reference: None,
            source: None,
        }
    }

    /// Set the reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Magnitude of the entry, used when comparing against bank amounts
    pub fn magnitude(&self) -> Money {
        self.amount.abs()
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount,
            self.account
        )
    }
}
