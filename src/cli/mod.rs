//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod history;
pub mod import;
pub mod reconcile;
pub mod rules;

pub use history::handle_history_command;
pub use import::{handle_import_command, handle_statements_command};
pub use reconcile::{handle_reconcile_command, OutputFormat, ReconcileArgs};
pub use rules::{handle_rules_command, RulesCommands};

use crate::error::{ReconError, ReconResult};
use crate::models::SessionId;

/// Parse a session ID, or start a new session when none is given
pub(crate) fn parse_session(session: Option<&str>) -> ReconResult<SessionId> {
    match session {
        Some(s) => s
            .parse()
            .map_err(|_| ReconError::Validation(format!("Invalid session ID: '{}'", s))),
        None => Ok(SessionId::new()),
    }
}

/// Statement delimiters must be a single ASCII character
pub(crate) fn delimiter_byte(c: char) -> ReconResult<u8> {
    if c.is_ascii() && c != '"' && c != '\n' && c != '\r' {
        Ok(c as u8)
    } else {
        Err(ReconError::Validation(format!("Unsupported delimiter: {:?}", c)))
    }
}
