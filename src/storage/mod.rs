//! Storage layer for statement-recon
//!
//! The matching engine never touches storage directly. Rules and history
//! reach it through the repository traits defined here, so hosts can plug in
//! their own persistence. File-backed implementations use JSON/YAML with
//! atomic writes.

pub mod file_io;
pub mod ledger;
pub mod rules;
pub mod statements;

pub use file_io::{read_json, read_json_required, write_json_atomic};
pub use ledger::load_ledger_entries;
pub use rules::{MemoryRuleRepository, RuleFileRepository};
pub use statements::StatementStore;

use crate::audit::{HistoryEntry, HistoryLog};
use crate::config::paths::ReconPaths;
use crate::error::ReconResult;
use crate::models::{ReconciliationRule, SessionId};

/// Source of reconciliation rules
pub trait RuleRepository {
    /// Load every stored rule, enabled or not
    fn load_rules(&self) -> ReconResult<Vec<ReconciliationRule>>;

    /// Replace the stored rule set
    fn save_rules(&self, rules: &[ReconciliationRule]) -> ReconResult<()>;
}

/// Append-only sink for reconciliation history
pub trait HistoryRepository {
    /// Append one entry
    fn append_history(&self, entry: &HistoryEntry) -> ReconResult<()>;

    /// Append several entries
    fn append_history_batch(&self, entries: &[HistoryEntry]) -> ReconResult<()> {
        for entry in entries {
            self.append_history(entry)?;
        }
        Ok(())
    }

    /// Entries for one session, or all entries when `session_id` is `None`,
    /// in the order they were appended
    fn query_history(&self, session_id: Option<&SessionId>) -> ReconResult<Vec<HistoryEntry>>;
}

/// File-backed storage rooted at the configured data directory
pub struct Storage {
    pub rules: RuleFileRepository,
    pub history: HistoryLog,
    pub statements: StatementStore,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: &ReconPaths) -> ReconResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            rules: RuleFileRepository::new(paths.rules_file()),
            history: HistoryLog::new(paths.history_log()),
            statements: StatementStore::new(paths.statements_dir()),
        })
    }
}
