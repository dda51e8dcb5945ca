//! Discrepancy detection
//!
//! Classifies anomalies in a finished match set. Output is advisory and is
//! fully determined by the inputs, so running detection twice yields the same
//! discrepancies in the same order.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::config::MatchingConfig;
use crate::models::{
    Discrepancy, DiscrepancyKind, LedgerEntry, LedgerEntryId, Money, ReconciliationMatch,
    Severity, Transaction, TransactionId,
};

/// Amounts further apart than this (in cents) are a mismatch
const AMOUNT_TOLERANCE_CENTS: i64 = 1;

/// Finds unmatched items, drifted matches and duplicate clusters
#[derive(Debug, Clone, Default)]
pub struct DiscrepancyDetector {
    config: MatchingConfig,
}

impl DiscrepancyDetector {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Run every check
    ///
    /// Order: unmatched transactions, unmatched ledger entries, per-match
    /// mismatches, then duplicate clusters.
    pub fn detect(
        &self,
        transactions: &[Transaction],
        entries: &[LedgerEntry],
        matches: &[ReconciliationMatch],
    ) -> Vec<Discrepancy> {
        let mut found = self.missing_entries(transactions, entries, matches);
        for m in matches {
            found.extend(self.check_match(m));
        }
        found.extend(self.duplicates(transactions));

        tracing::info!(discrepancies = found.len(), "discrepancy detection complete");
        found
    }

    /// Transactions and ledger entries that appear in no match
    pub fn missing_entries(
        &self,
        transactions: &[Transaction],
        entries: &[LedgerEntry],
        matches: &[ReconciliationMatch],
    ) -> Vec<Discrepancy> {
        let matched_txns: HashSet<TransactionId> =
            matches.iter().map(|m| m.transaction.id).collect();
        let matched_entries: HashSet<LedgerEntryId> =
            matches.iter().map(|m| m.ledger_entry.id).collect();

        let unmatched_txns = transactions
            .iter()
            .filter(|t| !matched_txns.contains(&t.id))
            .map(|t| {
                Discrepancy::new(
                    DiscrepancyKind::MissingEntry,
                    Severity::Medium,
                    format!("Bank transaction '{}' has no ledger entry", t),
                    "Record the transaction in the ledger or pair it manually",
                )
                .with_transaction(t.id)
                .with_amount(t.signed_amount())
                .with_date(t.date)
            });

        let unmatched_entries = entries
            .iter()
            .filter(|e| !matched_entries.contains(&e.id))
            .map(|e| {
                Discrepancy::new(
                    DiscrepancyKind::MissingEntry,
                    Severity::Medium,
                    format!("Ledger entry '{}' does not appear on the statement", e),
                    "Check whether the payment cleared or the entry was posted in error",
                )
                .with_ledger_entry(e.id)
                .with_amount(e.amount)
                .with_date(e.date)
            });

        unmatched_txns.chain(unmatched_entries).collect()
    }

    /// Amount and date drift within one accepted match
    pub fn check_match(&self, m: &ReconciliationMatch) -> Vec<Discrepancy> {
        let mut found = Vec::new();

        let diff = m.amount_difference();
        if diff.cents() > AMOUNT_TOLERANCE_CENTS {
            let severity = if diff > self.config.high_severity_amount {
                Severity::High
            } else {
                Severity::Medium
            };
            found.push(
                Discrepancy::new(
                    DiscrepancyKind::AmountMismatch,
                    severity,
                    format!(
                        "Amounts differ by {}: statement {}, ledger {}",
                        diff,
                        m.transaction.amount,
                        m.ledger_entry.magnitude()
                    ),
                    "Verify the amount with the bank and correct the ledger entry",
                )
                .with_transaction(m.transaction.id)
                .with_ledger_entry(m.ledger_entry.id)
                .with_match(m.id)
                .with_amount(diff),
            );
        }

        let days = m.date_distance_days();
        let skip_estimated = self.config.ignore_estimated_dates && m.transaction.date_estimated;
        if days > self.config.date_mismatch_days && !skip_estimated {
            found.push(
                Discrepancy::new(
                    DiscrepancyKind::DateMismatch,
                    Severity::Low,
                    format!(
                        "Dates are {} days apart: statement {}, ledger {}",
                        days, m.transaction.date, m.ledger_entry.date
                    ),
                    "Confirm the posting date of the ledger entry",
                )
                .with_transaction(m.transaction.id)
                .with_ledger_entry(m.ledger_entry.id)
                .with_match(m.id)
                .with_date(m.transaction.date),
            );
        }

        found
    }

    /// One discrepancy per group of two or more transactions sharing an
    /// amount and a date, regardless of direction
    pub fn duplicates(&self, transactions: &[Transaction]) -> Vec<Discrepancy> {
        let mut clusters: BTreeMap<(Money, NaiveDate), Vec<TransactionId>> = BTreeMap::new();
        for t in transactions {
            clusters
                .entry((t.amount, t.date))
                .or_default()
                .push(t.id);
        }

        clusters
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|((amount, date), ids)| {
                let mut d = Discrepancy::new(
                    DiscrepancyKind::Duplicate,
                    Severity::Medium,
                    format!("{} transactions of {} on {}", ids.len(), amount, date),
                    "Check the statement for duplicated transactions",
                )
                .with_amount(amount)
                .with_date(date);
                d.related_transactions = ids;
                d
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryDirection, MatchMethod};
    use crate::services::MatchCoordinator;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(cents: i64, day: u32, desc: &str) -> Transaction {
        Transaction::new(date(2024, 2, day), desc, Money::from_cents(cents))
    }

    fn entry(cents: i64, day: u32, desc: &str) -> LedgerEntry {
        LedgerEntry::new(
            date(2024, 2, day),
            desc,
            Money::from_cents(cents),
            EntryDirection::Credit,
            "Operating",
        )
    }

    fn pair(t: &Transaction, e: &LedgerEntry) -> ReconciliationMatch {
        ReconciliationMatch::new(t.clone(), e.clone(), 90, "test", MatchMethod::Fuzzy)
    }

    fn kinds(found: &[Discrepancy]) -> Vec<DiscrepancyKind> {
        found.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_exact_match_has_no_discrepancies() {
        let txns = vec![txn(500000, 1, "Rent")];
        let entries = vec![entry(500000, 1, "Rent")];
        let matches = MatchCoordinator::default().run(&txns, &entries, &[]);

        let found = DiscrepancyDetector::default().detect(&txns, &entries, &matches);
        assert!(found.is_empty());
    }

    #[test]
    fn test_unmatched_both_sides() {
        let txns = vec![txn(9_999_999_900, 3, "Wire")];
        let entries = vec![entry(1500, 27, "Stationery")];
        let matches = MatchCoordinator::default().run(&txns, &entries, &[]);
        assert!(matches.is_empty());

        let found = DiscrepancyDetector::default().detect(&txns, &entries, &matches);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, DiscrepancyKind::MissingEntry);
        assert_eq!(found[0].transaction_id, Some(txns[0].id));
        assert_eq!(found[0].severity, Severity::Medium);
        assert_eq!(found[1].ledger_entry_id, Some(entries[0].id));
    }

    #[test]
    fn test_amount_mismatch_severity() {
        let detector = DiscrepancyDetector::default();
        let t = txn(10000, 1, "x");

        assert!(detector.check_match(&pair(&t, &entry(10001, 1, "x"))).is_empty());

        let medium = detector.check_match(&pair(&t, &entry(10500, 1, "x")));
        assert_eq!(kinds(&medium), vec![DiscrepancyKind::AmountMismatch]);
        assert_eq!(medium[0].severity, Severity::Medium);
        assert_eq!(medium[0].amount, Some(Money::from_cents(500)));

        let high = detector.check_match(&pair(&t, &entry(10000 + 100001, 1, "x")));
        assert_eq!(high[0].severity, Severity::High);
    }

    #[test]
    fn test_date_mismatch() {
        let detector = DiscrepancyDetector::default();
        let t = txn(10000, 1, "x");

        assert!(detector.check_match(&pair(&t, &entry(10000, 8, "x"))).is_empty());

        let late = detector.check_match(&pair(&t, &entry(10000, 9, "x")));
        assert_eq!(kinds(&late), vec![DiscrepancyKind::DateMismatch]);
        assert_eq!(late[0].severity, Severity::Low);
    }

    #[test]
    fn test_estimated_dates_can_be_ignored() {
        let mut t = txn(10000, 1, "x");
        t.date_estimated = true;
        let m = pair(&t, &entry(10000, 20, "x"));

        assert_eq!(DiscrepancyDetector::default().check_match(&m).len(), 1);

        let config = MatchingConfig {
            ignore_estimated_dates: true,
            ..MatchingConfig::default()
        };
        assert!(DiscrepancyDetector::new(config).check_match(&m).is_empty());
    }

    #[test]
    fn test_single_duplicate_per_cluster() {
        let txns = vec![
            txn(100000, 10, "Deposit"),
            txn(100000, 10, "Deposit"),
            txn(100000, 10, "Deposit"),
        ];
        let entries = vec![entry(100000, 10, "Deposit"), entry(100000, 10, "Deposit")];
        let matches = MatchCoordinator::default().run(&txns, &entries, &[]);
        assert_eq!(matches.len(), 2);

        let found = DiscrepancyDetector::default().detect(&txns, &entries, &matches);
        let duplicates: Vec<_> = found
            .iter()
            .filter(|d| d.kind == DiscrepancyKind::Duplicate)
            .collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].related_transactions.len(), 3);
        assert_eq!(duplicates[0].date, Some(date(2024, 2, 10)));

        let missing = found
            .iter()
            .filter(|d| d.kind == DiscrepancyKind::MissingEntry)
            .count();
        assert_eq!(missing, 1);
    }

    #[test]
    fn test_deposit_and_withdrawal_of_same_amount_cluster() {
        let txns = vec![
            txn(100000, 10, "Transfer in"),
            txn(-100000, 10, "Transfer out"),
            txn(-100000, 11, "Transfer out"),
        ];
        let found = DiscrepancyDetector::default().duplicates(&txns);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].related_transactions, vec![txns[0].id, txns[1].id]);
        assert_eq!(found[0].amount, Some(Money::from_cents(100000)));
    }

    #[test]
    fn test_same_amount_different_days_not_duplicate() {
        let txns = vec![txn(100000, 10, "Deposit"), txn(100000, 11, "Deposit")];
        assert!(DiscrepancyDetector::default().duplicates(&txns).is_empty());
    }

    #[test]
    fn test_detection_is_idempotent() {
        let txns = vec![
            txn(2500, 1, "Coffee"),
            txn(2500, 1, "Coffee"),
            txn(70000, 3, "Supplies"),
        ];
        let entries = vec![entry(2600, 12, "Coffee"), entry(12, 28, "Fees")];
        let matches = MatchCoordinator::default().run(&txns, &entries, &[]);

        let detector = DiscrepancyDetector::default();
        let first = detector.detect(&txns, &entries, &matches);
        let second = detector.detect(&txns, &entries, &matches);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
