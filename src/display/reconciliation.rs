//! Reconciliation display formatting
//!
//! Formats matches, discrepancies and session summaries for terminal output.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::truncate;
use crate::models::{Discrepancy, ImportedStatement, ReconciliationMatch};
use crate::services::ReconciliationSummary;

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Statement")]
    statement: String,
    #[tabled(rename = "Ledger")]
    ledger: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Conf")]
    confidence: String,
    #[tabled(rename = "Via")]
    method: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

#[derive(Tabled)]
struct DiscrepancyRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Suggested action")]
    action: String,
}

/// Format matches as a table
pub fn format_match_table(matches: &[ReconciliationMatch]) -> String {
    if matches.is_empty() {
        return "No matches.".to_string();
    }

    let rows = matches.iter().map(|m| MatchRow {
        date: m.transaction.date.format("%Y-%m-%d").to_string(),
        statement: truncate(&m.transaction.description, 28),
        ledger: truncate(&m.ledger_entry.description, 28),
        amount: m.transaction.signed_amount().to_string(),
        confidence: format!("{}%", m.confidence),
        method: m.method.to_string(),
        reason: truncate(&m.reason, 40),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

/// Format discrepancies as a table, most severe first
pub fn format_discrepancy_table(discrepancies: &[Discrepancy]) -> String {
    if discrepancies.is_empty() {
        return "No discrepancies.".to_string();
    }

    let mut sorted: Vec<&Discrepancy> = discrepancies.iter().collect();
    sorted.sort_by(|a, b| b.severity.cmp(&a.severity));

    let rows = sorted.into_iter().map(|d| DiscrepancyRow {
        severity: d.severity.to_string(),
        kind: d.kind.to_string(),
        description: truncate(&d.description, 60),
        action: d.suggested_action.clone(),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

/// Format the counts of a finished session
pub fn format_summary(summary: &ReconciliationSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Transactions:   {:>6}\n",
        summary.transactions
    ));
    output.push_str(&format!("Ledger entries: {:>6}\n", summary.ledger_entries));
    output.push_str(&format!(
        "Matched:        {:>6}  ({:.1}%, {} by rule, {} fuzzy)\n",
        summary.matched,
        summary.match_rate() * 100.0,
        summary.rule_matches,
        summary.fuzzy_matches
    ));
    if summary.flagged > 0 {
        output.push_str(&format!("Flagged:        {:>6}\n", summary.flagged));
    }
    output.push_str(&format!(
        "Unmatched:      {:>6} statement, {} ledger\n",
        summary.unmatched_transactions, summary.unmatched_entries
    ));
    output.push_str(&format!(
        "Discrepancies:  {:>6} missing, {} amount, {} date, {} duplicate\n",
        summary.missing_entries,
        summary.amount_mismatches,
        summary.date_mismatches,
        summary.duplicates
    ));

    output
}

/// Format the result of a statement import
pub fn format_import_summary(statement: &ImportedStatement) -> String {
    let mut output = format!(
        "Imported {} transactions from {} ({})\n",
        statement.len(),
        statement.filename,
        statement.format
    );
    output.push_str(&format!("Statement ID: {}\n", statement.id.as_uuid()));

    if statement.skipped_rows > 0 {
        output.push_str(&format!(
            "Skipped {} rows with fewer than three fields\n",
            statement.skipped_rows
        ));
    }
    if statement.estimated_dates > 0 {
        output.push_str(&format!(
            "Warning: {} rows had unreadable dates; the import date was used\n",
            statement.estimated_dates
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DiscrepancyKind, EntryDirection, LedgerEntry, MatchMethod, Money, Severity, Transaction,
    };
    use chrono::NaiveDate;

    #[test]
    fn test_empty_tables() {
        assert_eq!(format_match_table(&[]), "No matches.");
        assert_eq!(format_discrepancy_table(&[]), "No discrepancies.");
    }

    #[test]
    fn test_match_table_contents() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let m = ReconciliationMatch::new(
            Transaction::new(date, "Rent", Money::from_cents(-500000)),
            LedgerEntry::new(date, "Rent Feb", Money::from_cents(-500000), EntryDirection::Debit, "Rent"),
            97,
            "Monthly rent",
            MatchMethod::Fuzzy,
        );

        let table = format_match_table(&[m]);
        assert!(table.contains("2024-02-01"));
        assert!(table.contains("-5000.00"));
        assert!(table.contains("97%"));
        assert!(table.contains("fuzzy"));
    }

    #[test]
    fn test_discrepancies_sorted_by_severity() {
        let low = Discrepancy::new(DiscrepancyKind::DateMismatch, Severity::Low, "late", "check");
        let high = Discrepancy::new(DiscrepancyKind::AmountMismatch, Severity::High, "off", "fix");

        let table = format_discrepancy_table(&[low, high]);
        let high_pos = table.find("amount_mismatch").unwrap();
        let low_pos = table.find("date_mismatch").unwrap();
        assert!(high_pos < low_pos);
    }

    #[test]
    fn test_summary_lines() {
        let summary = ReconciliationSummary {
            transactions: 4,
            matched: 2,
            rule_matches: 1,
            fuzzy_matches: 1,
            ..Default::default()
        };
        let text = format_summary(&summary);
        assert!(text.contains("50.0%"));
        assert!(!text.contains("Flagged"));
    }
}
