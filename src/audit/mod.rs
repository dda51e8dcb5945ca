//! Reconciliation history for statement-recon
//!
//! Records imports, matches, unmatched items, rule applications and
//! discrepancies in an append-only log keyed by reconciliation session.
//!
//! # Architecture
//!
//! - `HistoryEntry`: a single record with session, action, operator,
//!   timestamp and a structured detail payload.
//! - `HistoryLog`: file-backed repository writing one JSON object per line.
//! - `MemoryHistory`: in-memory repository for hosts with their own storage.
//!
//! # Example
//!
//! ```rust,ignore
//! use recon::audit::{HistoryAction, HistoryEntry, HistoryLog};
//! use recon::storage::HistoryRepository;
//!
//! let log = HistoryLog::new(paths.history_log());
//! log.append_history(&HistoryEntry::new(session, HistoryAction::Imported, "alex", &details))?;
//! let entries = log.query_history(Some(&session))?;
//! ```

mod entry;
mod logger;

pub use entry::{HistoryAction, HistoryEntry};
pub use logger::{HistoryLog, MemoryHistory};
