//! Imported statement store
//!
//! Each imported statement is written once to `<dir>/<uuid>.json` and never
//! rewritten.

use std::path::PathBuf;

use crate::error::{ReconError, ReconResult};
use crate::models::{ImportedStatement, StatementId};

use super::file_io::{read_json_required, write_json_atomic};

/// Directory of imported statements
pub struct StatementStore {
    dir: PathBuf,
}

impl StatementStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, id: StatementId) -> PathBuf {
        self.dir.join(format!("{}.json", id.as_uuid()))
    }

    /// Persist a statement; statements are immutable so an existing file is an error
    pub fn save(&self, statement: &ImportedStatement) -> ReconResult<PathBuf> {
        let path = self.path_for(statement.id);
        if path.exists() {
            return Err(ReconError::Storage(format!(
                "Statement {} has already been stored",
                statement.id
            )));
        }
        write_json_atomic(&path, statement)?;
        Ok(path)
    }

    /// Load a statement by ID
    pub fn get(&self, id: StatementId) -> ReconResult<ImportedStatement> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(ReconError::statement_not_found(id.to_string()));
        }
        read_json_required(path)
    }

    /// List stored statements, oldest import first
    pub fn list(&self) -> ReconResult<Vec<ImportedStatement>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut statements = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                statements.push(read_json_required::<ImportedStatement, _>(&path)?);
            }
        }
        statements.sort_by(|a, b| a.imported_at.cmp(&b.imported_at));
        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, StatementFormat, Transaction};
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    fn statement() -> ImportedStatement {
        ImportedStatement {
            id: StatementId::new(),
            filename: "jan.csv".into(),
            format: StatementFormat::Csv,
            imported_at: Utc::now(),
            imported_by: "tester".into(),
            skipped_rows: 0,
            estimated_dates: 0,
            transactions: vec![Transaction::new(
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                "Coffee",
                Money::from_cents(-450),
            )],
        }
    }

    #[test]
    fn test_save_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = StatementStore::new(temp_dir.path().join("statements"));
        let stmt = statement();

        store.save(&stmt).unwrap();
        assert_eq!(store.get(stmt.id).unwrap(), stmt);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_statements_are_immutable() {
        let temp_dir = TempDir::new().unwrap();
        let store = StatementStore::new(temp_dir.path().to_path_buf());
        let stmt = statement();

        store.save(&stmt).unwrap();
        assert!(store.save(&stmt).is_err());
    }

    #[test]
    fn test_get_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = StatementStore::new(temp_dir.path().to_path_buf());
        assert!(store.get(StatementId::new()).unwrap_err().is_not_found());
    }
}
