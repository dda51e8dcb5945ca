//! History CLI command

use crate::display::format_history_table;
use crate::error::{ReconError, ReconResult};
use crate::models::SessionId;
use crate::services::HistoryRecorder;
use crate::storage::Storage;

/// Handle the history command
///
/// Shows the most recent `limit` entries, oldest first. `full` prints each
/// entry with its complete summary instead of a table.
pub fn handle_history_command(
    storage: &Storage,
    session: Option<&str>,
    limit: usize,
    full: bool,
) -> ReconResult<()> {
    if !storage.history.exists() {
        println!(
            "No history recorded yet ({}).",
            storage.history.path().display()
        );
        return Ok(());
    }

    let session_id = session
        .map(|s| {
            s.parse::<SessionId>()
                .map_err(|_| ReconError::Validation(format!("Invalid session ID: '{}'", s)))
        })
        .transpose()?;

    let mut entries = HistoryRecorder::new(&storage.history).query(session_id.as_ref())?;
    if entries.len() > limit {
        entries.drain(..entries.len() - limit);
    }

    if full {
        for entry in &entries {
            println!("{}", entry.format_human_readable());
        }
    } else {
        println!("{}", format_history_table(&entries));
    }
    Ok(())
}
