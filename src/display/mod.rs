//! Display formatting for terminal output
//!
//! Renders matches, discrepancies, rules and history as tables for the CLI.

pub mod history;
pub mod reconciliation;
pub mod rules;

pub use history::format_history_table;
pub use reconciliation::{
    format_discrepancy_table, format_import_summary, format_match_table, format_summary,
};
pub use rules::format_rule_table;

/// Shorten `s` to at most `max_len` characters, marking the cut with "..."
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
