//! Reconciliation CLI command
//!
//! Reconciles a statement (a file to import, or the ID of a stored import)
//! against a ledger export.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use super::import::import_statement;
use super::parse_session;
use crate::config::Settings;
use crate::display::{format_discrepancy_table, format_match_table, format_summary};
use crate::error::{ReconError, ReconResult};
use crate::models::{ImportedStatement, StatementId};
use crate::services::Reconciler;
use crate::storage::{load_ledger_entries, RuleFileRepository, RuleRepository, Storage};

/// Output format for reconciliation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Arguments for the reconcile command
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Statement file to import, or the ID of a previously imported statement
    pub statement: String,

    /// Ledger entries exported by the accounting system (JSON)
    #[arg(short, long)]
    pub ledger: PathBuf,

    /// Rules file (JSON or YAML); defaults to the configured rules file
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    /// Reconciliation session ID; a new session is started if omitted
    #[arg(short, long)]
    pub session: Option<String>,

    /// Operator recorded in history
    #[arg(short, long)]
    pub operator: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Handle the reconcile command
pub fn handle_reconcile_command(
    storage: &Storage,
    settings: &Settings,
    args: ReconcileArgs,
) -> ReconResult<()> {
    let operator = args
        .operator
        .clone()
        .unwrap_or_else(|| settings.default_operator.clone());
    let session_id = parse_session(args.session.as_deref())?;
    let session_text = session_id.as_uuid().to_string();

    let statement = load_statement(storage, settings, &args, &operator, &session_text)?;
    let entries = load_ledger_entries(&args.ledger)?;

    let file_rules;
    let rules: &dyn RuleRepository = match &args.rules {
        Some(path) => {
            if !path.exists() {
                return Err(ReconError::Rule(format!(
                    "Rules file not found: {}",
                    path.display()
                )));
            }
            file_rules = RuleFileRepository::new(path.clone());
            &file_rules
        }
        None => &storage.rules,
    };

    let reconciler = Reconciler::new(rules, &storage.history, settings.matching.clone());
    let outcome = reconciler.run(session_id, &operator, &statement.transactions, &entries)?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Table => {
            println!("Reconciliation session {}", session_text);
            println!("Statement: {} ({} transactions)", statement.filename, statement.len());
            println!();
            print!("{}", format_summary(&outcome.summary));
            println!();
            println!("Matches:");
            println!("{}", format_match_table(&outcome.matches));
            println!();
            println!("Discrepancies:");
            println!("{}", format_discrepancy_table(&outcome.discrepancies));
        }
    }

    Ok(())
}

fn load_statement(
    storage: &Storage,
    settings: &Settings,
    args: &ReconcileArgs,
    operator: &str,
    session: &str,
) -> ReconResult<ImportedStatement> {
    let path = Path::new(&args.statement);
    if path.exists() {
        return import_statement(storage, settings, path, Some(operator), None, Some(session));
    }

    let id: StatementId = args.statement.parse().map_err(|_| {
        ReconError::Validation(format!(
            "'{}' is neither a statement file nor a statement ID",
            args.statement
        ))
    })?;
    storage.statements.get(id)
}
