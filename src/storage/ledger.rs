//! Ledger entry input
//!
//! Ledger entries belong to the host ledger; this crate only reads them from
//! a JSON array or a `{ "entries": [...] }` document.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ReconError, ReconResult};
use crate::models::LedgerEntry;

#[derive(Deserialize)]
#[serde(untagged)]
enum LedgerFile {
    List(Vec<LedgerEntry>),
    Wrapped { entries: Vec<LedgerEntry> },
}

/// Load ledger entries from a JSON file, preserving file order
pub fn load_ledger_entries<P: AsRef<Path>>(path: P) -> ReconResult<Vec<LedgerEntry>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        ReconError::Io(format!("Failed to read ledger {}: {}", path.display(), e))
    })?;
    parse_ledger_entries(&content)
        .map_err(|e| ReconError::Json(format!("Failed to parse ledger {}: {}", path.display(), e)))
}

/// Parse ledger entries from JSON text
pub fn parse_ledger_entries(content: &str) -> Result<Vec<LedgerEntry>, serde_json::Error> {
    let file: LedgerFile = serde_json::from_str(content)?;
    Ok(match file {
        LedgerFile::List(entries) | LedgerFile::Wrapped { entries } => entries,
    })
}
