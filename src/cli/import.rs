//! CLI command handler for statement import
//!
//! Imports a delimited statement file, stores it and records the import in
//! the session history.

use std::path::Path;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{delimiter_byte, parse_session};
use crate::config::Settings;
use crate::display::format_import_summary;
use crate::error::{ReconError, ReconResult};
use crate::models::ImportedStatement;
use crate::services::{HistoryRecorder, StatementImporter};
use crate::storage::Storage;

/// Handle the import command
pub fn handle_import_command(
    storage: &Storage,
    settings: &Settings,
    file: &Path,
    operator: Option<&str>,
    delimiter: Option<char>,
    session: Option<&str>,
) -> ReconResult<()> {
    let statement = import_statement(storage, settings, file, operator, delimiter, session)?;

    print!("{}", format_import_summary(&statement));
    Ok(())
}

/// Import, store and record a statement file
///
/// Shared by `import` and `reconcile` when the latter is given a file.
pub(crate) fn import_statement(
    storage: &Storage,
    settings: &Settings,
    file: &Path,
    operator: Option<&str>,
    delimiter: Option<char>,
    session: Option<&str>,
) -> ReconResult<ImportedStatement> {
    if !file.exists() {
        return Err(ReconError::Import(format!(
            "File not found: {}",
            file.display()
        )));
    }

    let operator = operator.unwrap_or(&settings.default_operator);
    let session_id = parse_session(session)?;

    let mut importer = StatementImporter::new();
    if let Some(d) = delimiter.or(settings.delimiter) {
        importer = importer.with_delimiter(delimiter_byte(d)?);
    }

    let statement = importer.import_file(file, operator)?;
    let stored_at = storage.statements.save(&statement)?;
    tracing::debug!(path = %stored_at.display(), "statement stored");

    HistoryRecorder::new(&storage.history).record_import(session_id, operator, &statement)?;

    Ok(statement)
}

#[derive(Tabled)]
struct StatementRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Imported")]
    imported_at: String,
    #[tabled(rename = "By")]
    imported_by: String,
    #[tabled(rename = "File")]
    filename: String,
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "Rows")]
    rows: usize,
}

/// Handle the statements command: list stored imports
pub fn handle_statements_command(storage: &Storage) -> ReconResult<()> {
    let statements = storage.statements.list()?;
    if statements.is_empty() {
        println!("No statements imported yet.");
        return Ok(());
    }

    let rows = statements.iter().map(|s| StatementRow {
        id: s.id.as_uuid().to_string(),
        imported_at: s.imported_at.format("%Y-%m-%d %H:%M").to_string(),
        imported_by: s.imported_by.clone(),
        filename: s.filename.clone(),
        format: s.format.to_string(),
        rows: s.len(),
    });

    println!("{}", Table::new(rows).with(Style::psql()));
    Ok(())
}
