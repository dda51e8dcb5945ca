//! Reconciliation service
//!
//! Runs one reconciliation session end to end: load rules, pair transactions
//! with ledger entries, detect discrepancies, update transaction statuses and
//! record history. Rules and history come from injected repositories.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::discrepancy::DiscrepancyDetector;
use super::history::HistoryRecorder;
use super::matching::MatchCoordinator;
use crate::config::MatchingConfig;
use crate::error::ReconResult;
use crate::models::{
    Discrepancy, DiscrepancyKind, ImportedStatement, LedgerEntry, MatchMethod,
    ReconciliationMatch, ReconciliationRule, ReconciliationStatus, RuleId, SessionId, Transaction,
    TransactionId,
};
use crate::audit::HistoryEntry;
use crate::storage::{HistoryRepository, RuleRepository};

/// Service for running reconciliation sessions
pub struct Reconciler<'a> {
    rules: &'a dyn RuleRepository,
    history: &'a dyn HistoryRepository,
    config: MatchingConfig,
}

/// Everything one session produced
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationOutcome {
    pub session_id: SessionId,
    pub matches: Vec<ReconciliationMatch>,
    pub discrepancies: Vec<Discrepancy>,
    /// Copies of the input transactions with updated statuses, in input order
    pub transactions: Vec<Transaction>,
    pub summary: ReconciliationSummary,
}

impl ReconciliationOutcome {
    /// Transactions left unmatched after both passes
    pub fn unmatched_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.status == ReconciliationStatus::Unreconciled)
    }
}

/// Counts describing a finished session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationSummary {
    pub transactions: usize,
    pub ledger_entries: usize,
    pub matched: usize,
    pub rule_matches: usize,
    pub fuzzy_matches: usize,
    pub flagged: usize,
    pub unmatched_transactions: usize,
    pub unmatched_entries: usize,
    pub amount_mismatches: usize,
    pub date_mismatches: usize,
    pub missing_entries: usize,
    pub duplicates: usize,
}

impl ReconciliationSummary {
    /// Share of transactions that were matched, 0.0-1.0
    pub fn match_rate(&self) -> f64 {
        if self.transactions == 0 {
            0.0
        } else {
            self.matched as f64 / self.transactions as f64
        }
    }

    fn count_discrepancies(&mut self, discrepancies: &[Discrepancy]) {
        for d in discrepancies {
            match d.kind {
                DiscrepancyKind::AmountMismatch => self.amount_mismatches += 1,
                DiscrepancyKind::DateMismatch => self.date_mismatches += 1,
                DiscrepancyKind::MissingEntry => self.missing_entries += 1,
                DiscrepancyKind::Duplicate => self.duplicates += 1,
            }
        }
    }
}

impl<'a> Reconciler<'a> {
    /// Create a new reconciler
    pub fn new(
        rules: &'a dyn RuleRepository,
        history: &'a dyn HistoryRepository,
        config: MatchingConfig,
    ) -> Self {
        Self {
            rules,
            history,
            config,
        }
    }

    /// Record that a statement was imported for a session
    pub fn record_import(
        &self,
        session_id: SessionId,
        operator: &str,
        statement: &ImportedStatement,
    ) -> ReconResult<HistoryEntry> {
        HistoryRecorder::new(self.history).record_import(session_id, operator, statement)
    }

    /// Reconcile a statement's transactions against ledger entries
    ///
    /// The inputs are not modified. Matched transactions come back as
    /// `Reconciled`, or `Flagged` when the matching rule carries a flag
    /// action; unmatched ones keep their status.
    pub fn run(
        &self,
        session_id: SessionId,
        operator: &str,
        transactions: &[Transaction],
        entries: &[LedgerEntry],
    ) -> ReconResult<ReconciliationOutcome> {
        let rules = self.rules.load_rules()?;
        tracing::info!(
            session = %session_id,
            rules = rules.len(),
            transactions = transactions.len(),
            entries = entries.len(),
            "starting reconciliation"
        );

        let mut matches =
            MatchCoordinator::new(self.config.clone()).run(transactions, entries, &rules);
        let discrepancies =
            DiscrepancyDetector::new(self.config.clone()).detect(transactions, entries, &matches);

        let statuses = match_statuses(&matches, &rules);
        for m in &mut matches {
            if let Some(status) = statuses.get(&m.transaction.id) {
                m.transaction.status = *status;
            }
        }

        let updated: Vec<Transaction> = transactions
            .iter()
            .map(|t| {
                let mut t = t.clone();
                if let Some(status) = statuses.get(&t.id) {
                    t.status = *status;
                }
                t
            })
            .collect();

        let unmatched: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| !statuses.contains_key(&t.id))
            .collect();

        HistoryRecorder::new(self.history).record_run(
            session_id,
            operator,
            &rules,
            &matches,
            &unmatched,
            &discrepancies,
        )?;

        let matched_entries: HashSet<_> = matches.iter().map(|m| m.ledger_entry.id).collect();
        let mut summary = ReconciliationSummary {
            transactions: transactions.len(),
            ledger_entries: entries.len(),
            matched: matches.len(),
            rule_matches: matches.iter().filter(|m| m.method.is_rule()).count(),
            fuzzy_matches: matches.iter().filter(|m| !m.method.is_rule()).count(),
            flagged: statuses
                .values()
                .filter(|s| **s == ReconciliationStatus::Flagged)
                .count(),
            unmatched_transactions: unmatched.len(),
            unmatched_entries: entries.len() - matched_entries.len(),
            ..Default::default()
        };
        summary.count_discrepancies(&discrepancies);

        tracing::info!(
            session = %session_id,
            matched = summary.matched,
            unmatched = summary.unmatched_transactions,
            discrepancies = discrepancies.len(),
            "reconciliation complete"
        );

        Ok(ReconciliationOutcome {
            session_id,
            matches,
            discrepancies,
            transactions: updated,
            summary,
        })
    }
}

/// New status for every matched transaction
fn match_statuses(
    matches: &[ReconciliationMatch],
    rules: &[ReconciliationRule],
) -> HashMap<TransactionId, ReconciliationStatus> {
    let by_id: HashMap<RuleId, &ReconciliationRule> = rules.iter().map(|r| (r.id, r)).collect();

    matches
        .iter()
        .map(|m| {
            let flagged = match m.method {
                MatchMethod::Rule { rule_id } => by_id
                    .get(&rule_id)
                    .is_some_and(|r| r.flag_reason().is_some()),
                MatchMethod::Fuzzy => false,
            };
            let status = if flagged {
                ReconciliationStatus::Flagged
            } else {
                ReconciliationStatus::Reconciled
            };
            (m.transaction.id, status)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{HistoryAction, MemoryHistory};
    use crate::models::{Condition, ConditionField, EntryDirection, Money, RuleAction};
    use crate::storage::MemoryRuleRepository;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn fixtures() -> (Vec<Transaction>, Vec<LedgerEntry>) {
        let txns = vec![
            Transaction::new(date(1), "Rent May", Money::from_cents(-250000)),
            Transaction::new(date(3), "Client ACME", Money::from_cents(480000)),
            Transaction::new(date(9), "Unknown wire", Money::from_cents(-9_999_999_900)),
        ];
        let entries = vec![
            LedgerEntry::new(date(1), "Rent May", Money::from_cents(-250000), EntryDirection::Debit, "Rent"),
            LedgerEntry::new(date(4), "Invoice 17 ACME", Money::from_cents(480000), EntryDirection::Credit, "Sales"),
        ];
        (txns, entries)
    }

    fn acme_rule() -> ReconciliationRule {
        ReconciliationRule::new("ACME receipts", 10)
            .with_condition(Condition::Contains {
                field: ConditionField::Description,
                value: "acme".into(),
            })
            .with_condition(Condition::WithinDays { days: 5 })
            .with_action(RuleAction::Flag {
                reason: "check invoice".into(),
            })
    }

    #[test]
    fn test_full_session() {
        let (txns, entries) = fixtures();
        let rules = MemoryRuleRepository::new(vec![acme_rule()]);
        let history = MemoryHistory::new();
        let reconciler = Reconciler::new(&rules, &history, MatchingConfig::default());
        let session = SessionId::new();

        let outcome = reconciler.run(session, "alex", &txns, &entries).unwrap();

        assert_eq!(outcome.summary.matched, 2);
        assert_eq!(outcome.summary.rule_matches, 1);
        assert_eq!(outcome.summary.fuzzy_matches, 1);
        assert_eq!(outcome.summary.unmatched_transactions, 1);
        assert_eq!(outcome.summary.unmatched_entries, 0);
        assert_eq!(outcome.summary.missing_entries, 1);
        assert_eq!(outcome.summary.flagged, 1);

        assert_eq!(outcome.transactions[0].status, ReconciliationStatus::Reconciled);
        assert_eq!(outcome.transactions[1].status, ReconciliationStatus::Flagged);
        assert_eq!(outcome.transactions[2].status, ReconciliationStatus::Unreconciled);
        assert_eq!(outcome.unmatched_transactions().count(), 1);

        // inputs untouched
        assert!(txns.iter().all(|t| !t.is_reconciled()));

        let missing = &outcome.discrepancies[0];
        assert_eq!(missing.kind, DiscrepancyKind::MissingEntry);
        assert_eq!(missing.transaction_id, Some(txns[2].id));

        let logged = history.query_history(Some(&session)).unwrap();
        let count = |a: HistoryAction| logged.iter().filter(|e| e.action == a).count();
        assert_eq!(count(HistoryAction::Matched), 2);
        assert_eq!(count(HistoryAction::RuleApplied), 1);
        assert_eq!(count(HistoryAction::Unmatched), 1);
        assert_eq!(count(HistoryAction::DiscrepancyFound), 1);
    }

    #[test]
    fn test_match_rate() {
        let summary = ReconciliationSummary {
            transactions: 4,
            matched: 3,
            ..Default::default()
        };
        assert!((summary.match_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(ReconciliationSummary::default().match_rate(), 0.0);
    }

    #[test]
    fn test_empty_session() {
        let rules = MemoryRuleRepository::new(Vec::new());
        let history = MemoryHistory::new();
        let reconciler = Reconciler::new(&rules, &history, MatchingConfig::default());

        let outcome = reconciler.run(SessionId::new(), "alex", &[], &[]).unwrap();
        assert!(outcome.matches.is_empty());
        assert!(outcome.discrepancies.is_empty());
        assert!(history.query_history(None).unwrap().is_empty());
    }
}
