//! History recording service
//!
//! Turns reconciliation events into append-only history entries and hands
//! them to whatever `HistoryRepository` the host injected.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;

use crate::audit::{HistoryAction, HistoryEntry};
use crate::error::ReconResult;
use crate::models::{
    Discrepancy, ImportedStatement, MatchMethod, ReconciliationMatch, ReconciliationRule, RuleId,
    SessionId, Transaction,
};
use crate::storage::HistoryRepository;

/// Service for recording reconciliation history
pub struct HistoryRecorder<'a> {
    repo: &'a dyn HistoryRepository,
}

impl<'a> HistoryRecorder<'a> {
    pub fn new(repo: &'a dyn HistoryRepository) -> Self {
        Self { repo }
    }

    /// Append a single entry
    pub fn record<T: Serialize>(
        &self,
        session_id: SessionId,
        action: HistoryAction,
        operator: &str,
        details: &T,
    ) -> ReconResult<HistoryEntry> {
        let entry = HistoryEntry::new(session_id, action, operator, details);
        self.repo.append_history(&entry)?;
        Ok(entry)
    }

    /// Record a statement import
    pub fn record_import(
        &self,
        session_id: SessionId,
        operator: &str,
        statement: &ImportedStatement,
    ) -> ReconResult<HistoryEntry> {
        self.record(
            session_id,
            HistoryAction::Imported,
            operator,
            &json!({
                "summary": format!(
                    "Imported {} transactions from {}",
                    statement.len(),
                    statement.filename
                ),
                "statement_id": statement.id,
                "filename": statement.filename,
                "format": statement.format,
                "transactions": statement.len(),
                "skipped_rows": statement.skipped_rows,
                "estimated_dates": statement.estimated_dates,
            }),
        )
    }

    /// Record the outcome of one reconciliation run
    ///
    /// Writes one `matched` entry per match (plus `rule_applied` for
    /// rule-driven ones), one `unmatched` entry per leftover transaction and
    /// one `discrepancy_found` entry per discrepancy, in a single batch.
    pub fn record_run(
        &self,
        session_id: SessionId,
        operator: &str,
        rules: &[ReconciliationRule],
        matches: &[ReconciliationMatch],
        unmatched: &[&Transaction],
        discrepancies: &[Discrepancy],
    ) -> ReconResult<Vec<HistoryEntry>> {
        let by_id: HashMap<RuleId, &ReconciliationRule> = rules.iter().map(|r| (r.id, r)).collect();
        let mut entries = Vec::with_capacity(matches.len() * 2 + unmatched.len());

        for m in matches {
            entries.push(HistoryEntry::new(
                session_id,
                HistoryAction::Matched,
                operator,
                &json!({
                    "summary": format!(
                        "{} matched {} ({}%)",
                        m.transaction, m.ledger_entry.description, m.confidence
                    ),
                    "match_id": m.id,
                    "transaction_id": m.transaction.id,
                    "ledger_entry_id": m.ledger_entry.id,
                    "confidence": m.confidence,
                    "method": m.method,
                    "reason": m.reason,
                }),
            ));

            if let MatchMethod::Rule { rule_id } = m.method {
                let rule = by_id.get(&rule_id);
                entries.push(HistoryEntry::new(
                    session_id,
                    HistoryAction::RuleApplied,
                    operator,
                    &json!({
                        "summary": format!("Rule '{}' matched {}", m.reason, m.transaction.id),
                        "rule_id": rule_id,
                        "rule": m.reason,
                        "match_id": m.id,
                        "flag": rule.and_then(|r| r.flag_reason()),
                        "notes": rule.map(|r| r.notes()).unwrap_or_default(),
                    }),
                ));
            }
        }

        for txn in unmatched {
            entries.push(HistoryEntry::new(
                session_id,
                HistoryAction::Unmatched,
                operator,
                &json!({
                    "summary": format!("{} left unmatched", txn),
                    "transaction_id": txn.id,
                    "amount": txn.signed_amount(),
                    "date": txn.date,
                }),
            ));
        }

        for d in discrepancies {
            entries.push(HistoryEntry::new(
                session_id,
                HistoryAction::DiscrepancyFound,
                operator,
                &json!({
                    "summary": d.to_string(),
                    "discrepancy": d,
                }),
            ));
        }

        self.repo.append_history_batch(&entries)?;
        tracing::debug!(session = %session_id, entries = entries.len(), "history recorded");
        Ok(entries)
    }

    /// Entries for one session, or everything when `session_id` is `None`
    pub fn query(&self, session_id: Option<&SessionId>) -> ReconResult<Vec<HistoryEntry>> {
        self.repo.query_history(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryHistory;
    use crate::models::{
        Condition, DiscrepancyKind, EntryDirection, LedgerEntry, Money, RuleAction, Severity,
        StatementFormat, StatementId,
    };
    use chrono::{NaiveDate, Utc};

    fn txn(desc: &str) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            desc,
            Money::from_cents(-4200),
        )
    }

    fn entry(desc: &str) -> LedgerEntry {
        LedgerEntry::new(
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            desc,
            Money::from_cents(-4200),
            EntryDirection::Debit,
            "Office",
        )
    }

    #[test]
    fn test_record_import() {
        let repo = MemoryHistory::new();
        let recorder = HistoryRecorder::new(&repo);
        let session = SessionId::new();
        let statement = ImportedStatement {
            id: StatementId::new(),
            filename: "april.csv".into(),
            format: StatementFormat::Csv,
            imported_at: Utc::now(),
            imported_by: "alex".into(),
            skipped_rows: 1,
            estimated_dates: 0,
            transactions: vec![txn("Lunch")],
        };

        let entry = recorder.record_import(session, "alex", &statement).unwrap();
        assert_eq!(entry.action, HistoryAction::Imported);
        assert_eq!(entry.details["transactions"], 1);
        assert_eq!(entry.details["skipped_rows"], 1);
        assert_eq!(recorder.query(Some(&session)).unwrap().len(), 1);
    }

    #[test]
    fn test_record_run() {
        let repo = MemoryHistory::new();
        let recorder = HistoryRecorder::new(&repo);
        let session = SessionId::new();

        let rule = ReconciliationRule::new("Office supplies", 5)
            .with_condition(Condition::WithinDays { days: 1 })
            .with_action(RuleAction::Note {
                text: "stationery budget".into(),
            });
        let by_rule = ReconciliationMatch::new(
            txn("Paper"),
            entry("Paper"),
            100,
            "Office supplies",
            MatchMethod::Rule { rule_id: rule.id },
        );
        let by_score = ReconciliationMatch::new(
            txn("Ink"),
            entry("Ink"),
            100,
            "fuzzy",
            MatchMethod::Fuzzy,
        );
        let leftover = txn("Taxi");
        let discrepancy = Discrepancy::new(
            DiscrepancyKind::MissingEntry,
            Severity::Medium,
            "missing",
            "record it",
        )
        .with_transaction(leftover.id);

        let written = recorder
            .record_run(
                session,
                "alex",
                std::slice::from_ref(&rule),
                &[by_rule, by_score],
                &[&leftover],
                &[discrepancy],
            )
            .unwrap();

        let actions: Vec<_> = written.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                HistoryAction::Matched,
                HistoryAction::RuleApplied,
                HistoryAction::Matched,
                HistoryAction::Unmatched,
                HistoryAction::DiscrepancyFound,
            ]
        );
        assert_eq!(written[1].details["notes"][0], "stationery budget");
        assert!(written[1].details["flag"].is_null());
        assert_eq!(recorder.query(Some(&session)).unwrap().len(), 5);
        assert!(recorder.query(Some(&SessionId::new())).unwrap().is_empty());
    }
}
