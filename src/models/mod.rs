//! Core data models for statement-recon
//!
//! This module contains the data structures of the reconciliation domain:
//! bank transactions, ledger entries, rules, matches, discrepancies and
//! imported statements.

pub mod discrepancy;
pub mod ids;
pub mod ledger;
pub mod matching;
pub mod money;
pub mod rule;
pub mod statement;
pub mod transaction;

pub use discrepancy::{Discrepancy, DiscrepancyKind, Severity};
pub use ids::{
    HistoryEntryId, LedgerEntryId, MatchId, RuleId, SessionId, StatementId, TransactionId,
};
pub use ledger::{EntryDirection, LedgerEntry};
pub use matching::{MatchMethod, ReconciliationMatch};
pub use money::Money;
pub use rule::{
    Condition, ConditionField, ConditionValue, ReconciliationRule, RuleAction, RuleValidationError,
};
pub use statement::{ImportedStatement, StatementFormat};
pub use transaction::{ReconciliationStatus, Transaction, TransactionKind};
