use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use recon::cli::{
    handle_history_command, handle_import_command, handle_reconcile_command, handle_rules_command,
    handle_statements_command, ReconcileArgs, RulesCommands,
};
use recon::config::{ReconPaths, Settings};
use recon::storage::Storage;

#[derive(Parser)]
#[command(
    name = "recon",
    author = "Kaylee Beyene",
    version,
    about = "Reconcile bank statements against ledger entries",
    long_about = "recon imports delimited bank statements and pairs each transaction \
                  with an entry from your ledger, first through your own priority-ordered \
                  rules and then by fuzzy amount, date and description scoring. Anything \
                  left over or out of line is reported as a discrepancy."
)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a bank statement file
    Import {
        /// Path to the statement (CSV, TSV, semicolon or pipe delimited)
        file: PathBuf,
        /// Operator recorded in history
        #[arg(short, long)]
        operator: Option<String>,
        /// Field delimiter; detected from the header line if omitted
        #[arg(short, long)]
        delimiter: Option<char>,
        /// Reconciliation session ID to record the import under
        #[arg(short, long)]
        session: Option<String>,
    },

    /// List imported statements
    Statements,

    /// Reconcile a statement against ledger entries
    Reconcile(ReconcileArgs),

    /// Rule management commands
    #[command(subcommand)]
    Rules(RulesCommands),

    /// Show reconciliation history
    History {
        /// Only show entries for this session
        #[arg(short, long)]
        session: Option<String>,
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Print complete entries instead of a table
        #[arg(long)]
        full: bool,
    },

    /// Show current configuration and paths
    Config {
        /// Write the effective settings to config.json for editing
        #[arg(long)]
        save: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("RECON_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Initialize paths and settings
    let paths = ReconPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let storage = Storage::new(&paths)?;

    match cli.command {
        Some(Commands::Import {
            file,
            operator,
            delimiter,
            session,
        }) => {
            handle_import_command(
                &storage,
                &settings,
                &file,
                operator.as_deref(),
                delimiter,
                session.as_deref(),
            )?;
        }
        Some(Commands::Statements) => {
            handle_statements_command(&storage)?;
        }
        Some(Commands::Reconcile(args)) => {
            handle_reconcile_command(&storage, &settings, args)?;
        }
        Some(Commands::Rules(cmd)) => {
            handle_rules_command(&storage, cmd)?;
        }
        Some(Commands::History {
            session,
            limit,
            full,
        }) => {
            handle_history_command(&storage, session.as_deref(), limit, full)?;
        }
        Some(Commands::Config { save }) => {
            if save {
                settings.save(&paths)?;
                println!("Settings written to {}", paths.settings_file().display());
                println!();
            }
            println!("statement-recon Configuration");
            println!("=============================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Statements:       {}", paths.statements_dir().display());
            println!("Rules file:       {}", paths.rules_file().display());
            println!("History log:      {}", paths.history_log().display());
            println!();
            println!("Settings:");
            println!("  Default operator:       {}", settings.default_operator);
            match settings.delimiter {
                Some(d) => println!("  Delimiter:              {:?}", d),
                None => println!("  Delimiter:              auto-detect"),
            }
            println!("  Fuzzy threshold:        {}", settings.matching.fuzzy_threshold);
            println!("  Rule priority weight:   {}", settings.matching.rule_priority_weight);
            println!("  Date mismatch days:     {}", settings.matching.date_mismatch_days);
            println!("  High severity amount:   {}", settings.matching.high_severity_amount);
            println!(
                "  Ignore estimated dates: {}",
                settings.matching.ignore_estimated_dates
            );
        }
        None => {
            println!("recon - bank statement reconciliation");
            println!();
            println!("Run 'recon --help' for usage information.");
        }
    }

    Ok(())
}
