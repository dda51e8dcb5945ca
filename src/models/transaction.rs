//! Bank transaction model
//!
//! Represents a single cash movement reported by a bank statement. Amounts
//! are stored as a non-negative magnitude plus a direction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TransactionId;
use super::money::Money;

/// Direction of a bank transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming into the account
    #[default]
    Deposit,
    /// Money leaving the account
    Withdrawal,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => write!(f, "Deposit"),
            Self::Withdrawal => write!(f, "Withdrawal"),
        }
    }
}

/// Reconciliation status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationStatus {
    /// Not yet paired with a ledger entry
    #[default]
    Unreconciled,
    /// Paired with a ledger entry
    Reconciled,
    /// Paired, but a rule asked for human review
    Flagged,
}

impl fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreconciled => write!(f, "Unreconciled"),
            Self::Reconciled => write!(f, "Reconciled"),
            Self::Flagged => write!(f, "Flagged"),
        }
    }
}

/// A bank-reported transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Transaction date
    pub date: NaiveDate,

    /// True when the statement date could not be parsed and `date` holds the
    /// import-time clock value instead
    #[serde(default)]
    pub date_estimated: bool,

    /// Free-text description from the statement
    #[serde(default)]
    pub description: String,

    /// Magnitude of the movement (never negative)
    pub amount: Money,

    /// Deposit or withdrawal
    #[serde(default)]
    pub kind: TransactionKind,

    /// Running balance reported by the bank, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Money>,

    /// External reference (check number, bank reference, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Reconciliation status
    #[serde(default)]
    pub status: ReconciliationStatus,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction from a signed amount
    ///
    /// Negative amounts become withdrawals; the stored amount is the magnitude.
    pub fn new(date: NaiveDate, description: impl Into<String>, signed_amount: Money) -> Self {
        let kind = if signed_amount.is_negative() {
            TransactionKind::Withdrawal
        } else {
            TransactionKind::Deposit
        };
        Self::with_kind(date, description, signed_amount.abs(), kind)
    }

    /// Create a new transaction from a magnitude and an explicit direction
    pub fn with_kind(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Money,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            date,
            date_estimated: false,
            description: description.into(),
            amount: amount.abs(),
            kind,
            balance: None,
            reference: None,
            status: ReconciliationStatus::Unreconciled,
            created_at: Utc::now(),
        }
    }

    /// Set the external reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// The amount with withdrawals negative
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionKind::Deposit => self.amount,
            TransactionKind::Withdrawal => -self.amount,
        }
    }

    /// Check if this is a withdrawal
    pub fn is_withdrawal(&self) -> bool {
        self.kind == TransactionKind::Withdrawal
    }

    /// Check if this transaction has been paired
    pub fn is_reconciled(&self) -> bool {
        !matches!(self.status, ReconciliationStatus::Unreconciled)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.signed_amount()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_negative_amount_is_withdrawal() {
        let txn = Transaction::new(date(2024, 1, 15), "Coffee", Money::from_cents(-50000));
        assert_eq!(txn.kind, TransactionKind::Withdrawal);
        assert_eq!(txn.amount.cents(), 50000);
        assert_eq!(txn.signed_amount().cents(), -50000);
        assert!(txn.is_withdrawal());
    }

    #[test]
    fn test_positive_amount_is_deposit() {
        let txn = Transaction::new(date(2024, 1, 16), "Payroll", Money::from_cents(120000));
        assert_eq!(txn.kind, TransactionKind::Deposit);
        assert_eq!(txn.status, ReconciliationStatus::Unreconciled);
        assert!(!txn.is_reconciled());
    }

    #[test]
    fn test_serialization_defaults() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "date": "2024-02-01",
            "amount": 500000,
            "created_at": "2024-02-01T00:00:00Z"
        }"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.kind, TransactionKind::Deposit);
        assert!(txn.description.is_empty());
        assert!(!txn.date_estimated);
        assert!(txn.reference.is_none());
    }

    #[test]
    fn test_display() {
        let txn = Transaction::new(date(2024, 1, 15), "Coffee", Money::from_cents(-450));
        assert_eq!(txn.to_string(), "2024-01-15 Coffee -4.50");
    }
}
