//! Append-only reconciliation history log
//!
//! `HistoryLog` writes history entries to a file, one JSON object per line,
//! flushing after each write. `MemoryHistory` keeps entries in memory for
//! hosts that persist history themselves.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{ReconError, ReconResult};
use crate::models::SessionId;
use crate::storage::HistoryRepository;

use super::entry::HistoryEntry;

/// File-backed history repository using line-delimited JSON (JSONL)
pub struct HistoryLog {
    /// Path to the history log file
    log_path: PathBuf,
}

impl HistoryLog {
    /// Create a new HistoryLog that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append multiple entries, flushing once at the end
    pub fn log_batch(&self, entries: &[HistoryEntry]) -> ReconResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut file = self.open_for_append()?;

        for entry in entries {
            let json = serde_json::to_string(entry).map_err(|e| {
                ReconError::Json(format!("Failed to serialize history entry: {}", e))
            })?;

            writeln!(file, "{}", json)
                .map_err(|e| ReconError::Io(format!("Failed to write history entry: {}", e)))?;
        }

        file.flush()
            .map_err(|e| ReconError::Io(format!("Failed to flush history log: {}", e)))?;

        Ok(())
    }

    /// Read all entries in the order they were written
    pub fn read_all(&self) -> ReconResult<Vec<HistoryEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| ReconError::Io(format!("Failed to open history log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                ReconError::Io(format!(
                    "Failed to read history log line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: HistoryEntry = serde_json::from_str(&line).map_err(|e| {
                ReconError::Json(format!(
                    "Failed to parse history entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Check if the log file exists
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    /// Get the path to the log file
    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }

    fn open_for_append(&self) -> ReconResult<File> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ReconError::Io(format!("Failed to create history directory: {}", e))
            })?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| ReconError::Io(format!("Failed to open history log: {}", e)))
    }
}

impl HistoryRepository for HistoryLog {
    fn append_history(&self, entry: &HistoryEntry) -> ReconResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    fn append_history_batch(&self, entries: &[HistoryEntry]) -> ReconResult<()> {
        self.log_batch(entries)
    }

    fn query_history(&self, session_id: Option<&SessionId>) -> ReconResult<Vec<HistoryEntry>> {
        let mut entries = self.read_all()?;
        if let Some(session_id) = session_id {
            entries.retain(|e| &e.session_id == session_id);
        }
        Ok(entries)
    }
}

/// In-memory history repository
#[derive(Default)]
pub struct MemoryHistory {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryRepository for MemoryHistory {
    fn append_history(&self, entry: &HistoryEntry) -> ReconResult<()> {
        let mut entries = self.entries.write().map_err(|e| {
            ReconError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        entries.push(entry.clone());
        Ok(())
    }

    fn query_history(&self, session_id: Option<&SessionId>) -> ReconResult<Vec<HistoryEntry>> {
        let entries = self.entries.read().map_err(|e| {
            ReconError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(entries
            .iter()
            .filter(|e| session_id.map_or(true, |s| &e.session_id == s))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::HistoryAction;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_log() -> (HistoryLog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log = HistoryLog::new(temp_dir.path().join("history.log"));
        (log, temp_dir)
    }

    fn entry(session: SessionId, action: HistoryAction, n: usize) -> HistoryEntry {
        HistoryEntry::new(session, action, "tester", &json!({ "n": n }))
    }

    #[test]
    fn test_append_and_read() {
        let (log, _temp) = create_test_log();
        let session = SessionId::new();

        log.append_history(&entry(session, HistoryAction::Imported, 0))
            .unwrap();

        let entries = log.query_history(None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, HistoryAction::Imported);
        assert_eq!(entries[0].session_id, session);
    }

    #[test]
    fn test_query_by_session() {
        let (log, _temp) = create_test_log();
        let first = SessionId::new();
        let second = SessionId::new();

        let batch: Vec<HistoryEntry> = (0..4)
            .map(|i| {
                let session = if i % 2 == 0 { first } else { second };
                entry(session, HistoryAction::Matched, i)
            })
            .collect();
        log.append_history_batch(&batch).unwrap();

        let firsts = log.query_history(Some(&first)).unwrap();
        assert_eq!(firsts.len(), 2);
        assert_eq!(firsts[0].details["n"], 0);
        assert_eq!(firsts[1].details["n"], 2);
        assert_eq!(log.query_history(None).unwrap().len(), 4);
    }

    #[test]
    fn test_empty_log() {
        let (log, _temp) = create_test_log();
        assert!(!log.exists());
        assert!(log.query_history(None).unwrap().is_empty());
    }

    #[test]
    fn test_survives_restart() {
        let (log, temp) = create_test_log();
        log.append_history(&entry(SessionId::new(), HistoryAction::Unmatched, 1))
            .unwrap();

        let reopened = HistoryLog::new(temp.path().join("history.log"));
        assert_eq!(reopened.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_line_reports_line_number() {
        let (log, _temp) = create_test_log();
        log.append_history(&entry(SessionId::new(), HistoryAction::Matched, 1))
            .unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .and_then(|mut f| writeln!(f, "not json"))
            .unwrap();

        let err = log.read_all().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_memory_history() {
        let history = MemoryHistory::new();
        let session = SessionId::new();
        history
            .append_history(&entry(session, HistoryAction::Matched, 1))
            .unwrap();
        history
            .append_history(&entry(SessionId::new(), HistoryAction::Matched, 2))
            .unwrap();

        assert_eq!(history.query_history(Some(&session)).unwrap().len(), 1);
        assert_eq!(history.query_history(None).unwrap().len(), 2);
    }
}
