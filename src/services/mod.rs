//! Service layer for statement-recon
//!
//! The matching engine lives here: statement import, rule evaluation, fuzzy
//! scoring, match coordination and discrepancy detection are pure functions
//! over in-memory collections. `Reconciler` ties them together with the
//! injected rule and history repositories.

pub mod discrepancy;
pub mod fuzzy;
pub mod history;
pub mod import;
pub mod matching;
pub mod reconciliation;
pub mod rules;
pub mod similarity;

pub use discrepancy::DiscrepancyDetector;
pub use fuzzy::{rule_confidence, FuzzyMatcher, FuzzyScore};
pub use history::HistoryRecorder;
pub use import::{ColumnMapping, StatementImporter};
pub use matching::{active_rules, MatchCoordinator};
pub use reconciliation::{ReconciliationOutcome, ReconciliationSummary, Reconciler};
pub use rules::RuleEngine;
pub use similarity::similarity;
