//! Rule CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::display::format_rule_table;
use crate::error::ReconResult;
use crate::storage::{RuleFileRepository, RuleRepository, Storage};

/// Rule subcommands
#[derive(Subcommand)]
pub enum RulesCommands {
    /// List rules in evaluation order
    List {
        /// Rules file (JSON or YAML); defaults to the configured rules file
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },
    /// Check a rules file for invalid definitions
    Validate {
        /// Rules file (JSON or YAML); defaults to the configured rules file
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },
}

/// Handle a rules command
pub fn handle_rules_command(storage: &Storage, cmd: RulesCommands) -> ReconResult<()> {
    match cmd {
        RulesCommands::List { rules } => {
            let loaded = repository(storage, rules).load_rules()?;
            println!("{}", format_rule_table(&loaded));
        }
        RulesCommands::Validate { rules } => {
            let repo = repository(storage, rules);
            // Loading validates every rule
            let loaded = repo.load_rules()?;
            let enabled = loaded.iter().filter(|r| r.enabled).count();
            println!(
                "{}: {} rules OK ({} enabled, {} disabled)",
                repo.path().display(),
                loaded.len(),
                enabled,
                loaded.len() - enabled
            );
        }
    }
    Ok(())
}

fn repository(storage: &Storage, path: Option<PathBuf>) -> RuleFileRepository {
    match path {
        Some(path) => RuleFileRepository::new(path),
        None => RuleFileRepository::new(storage.rules.path().clone()),
    }
}
