//! statement-recon - bank statement to ledger reconciliation
//!
//! This library pairs bank-reported transactions with internally recorded
//! ledger entries, and reports whatever cannot be paired or looks wrong.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (transactions, ledger entries, rules, matches, etc.)
//! - `storage`: Repository traits and their JSON/YAML file implementations
//! - `services`: Import, rule evaluation, fuzzy scoring, matching and detection
//! - `audit`: Append-only reconciliation history
//! - `cli` / `display`: The `recon` command line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use recon::audit::MemoryHistory;
//! use recon::config::MatchingConfig;
//! use recon::models::SessionId;
//! use recon::services::{Reconciler, StatementImporter};
//! use recon::storage::MemoryRuleRepository;
//!
//! let statement = StatementImporter::new().import_str(csv, "may.csv", "alex")?;
//! let rules = MemoryRuleRepository::new(my_rules);
//! let history = MemoryHistory::new();
//!
//! let outcome = Reconciler::new(&rules, &history, MatchingConfig::default())
//!     .run(SessionId::new(), "alex", &statement.transactions, &ledger_entries)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{ReconError, ReconResult};
