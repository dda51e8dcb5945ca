//! History display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::truncate;
use crate::audit::HistoryEntry;

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Time (UTC)")]
    timestamp: String,
    #[tabled(rename = "Session")]
    session: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Operator")]
    operator: String,
    #[tabled(rename = "Summary")]
    summary: String,
}

/// Format history entries as a table, oldest first
pub fn format_history_table(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history recorded.".to_string();
    }

    let rows = entries.iter().map(|e| HistoryRow {
        timestamp: e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        session: e.session_id.to_string(),
        action: e.action.to_string(),
        operator: e.operator.clone(),
        summary: truncate(
            e.details
                .get("summary")
                .and_then(|v| v.as_str())
                .unwrap_or(""),
            60,
        ),
    });

    Table::new(rows).with(Style::psql()).to_string()
}
