//! Match coordination
//!
//! Pairs bank transactions with ledger entries in two passes:
//!
//! 1. Rules, highest priority first. Each rule walks the still-unmatched
//!    transactions in order and takes the first still-unmatched entry it
//!    accepts.
//! 2. Fuzzy scoring for whatever is left. Each transaction takes its
//!    best-scoring entry if the score reaches the threshold; ties go to the
//!    entry seen first.
//!
//! No transaction or entry is paired twice within a run. Inputs are never
//! modified; matches hold their own copies.

use super::fuzzy::{rule_confidence, FuzzyMatcher};
use super::rules::RuleEngine;
use crate::config::MatchingConfig;
use crate::models::{LedgerEntry, MatchMethod, ReconciliationMatch, ReconciliationRule, Transaction};

/// Runs the rule and fuzzy passes over one session's collections
#[derive(Debug, Clone)]
pub struct MatchCoordinator {
    config: MatchingConfig,
    engine: RuleEngine,
    fuzzy: FuzzyMatcher,
}

impl Default for MatchCoordinator {
    fn default() -> Self {
        Self::new(MatchingConfig::default())
    }
}

impl MatchCoordinator {
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            config,
            engine: RuleEngine::new(),
            fuzzy: FuzzyMatcher::new(),
        }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Pair transactions with ledger entries
    ///
    /// `rules` may be in any order and may include disabled rules; only
    /// enabled rules are used, by descending priority.
    pub fn run(
        &self,
        transactions: &[Transaction],
        entries: &[LedgerEntry],
        rules: &[ReconciliationRule],
    ) -> Vec<ReconciliationMatch> {
        let mut txn_matched = vec![false; transactions.len()];
        let mut entry_matched = vec![false; entries.len()];

        let mut matches = self.rule_pass(
            transactions,
            entries,
            &active_rules(rules),
            &mut txn_matched,
            &mut entry_matched,
        );
        let rule_matches = matches.len();

        matches.extend(self.fuzzy_pass(
            transactions,
            entries,
            &mut txn_matched,
            &mut entry_matched,
        ));

        tracing::info!(
            transactions = transactions.len(),
            entries = entries.len(),
            rule_matches,
            fuzzy_matches = matches.len() - rule_matches,
            unmatched = txn_matched.iter().filter(|m| !**m).count(),
            "matching complete"
        );

        matches
    }

    fn rule_pass(
        &self,
        transactions: &[Transaction],
        entries: &[LedgerEntry],
        rules: &[&ReconciliationRule],
        txn_matched: &mut [bool],
        entry_matched: &mut [bool],
    ) -> Vec<ReconciliationMatch> {
        let mut matches = Vec::new();

        for rule in rules {
            for (ti, txn) in transactions.iter().enumerate() {
                if txn_matched[ti] {
                    continue;
                }

                let found = entries.iter().enumerate().find(|(ei, entry)| {
                    !entry_matched[*ei] && self.engine.evaluate(rule, txn, entry)
                });

                if let Some((ei, entry)) = found {
                    let confidence = rule_confidence(
                        self.fuzzy.confidence(txn, entry),
                        rule.priority,
                        self.config.rule_priority_weight,
                    );
                    tracing::debug!(
                        transaction = %txn.id,
                        entry = %entry.id,
                        rule = %rule.name,
                        confidence,
                        "rule match"
                    );
                    txn_matched[ti] = true;
                    entry_matched[ei] = true;
                    matches.push(ReconciliationMatch::new(
                        txn.clone(),
                        entry.clone(),
                        confidence,
                        rule.name.clone(),
                        MatchMethod::Rule { rule_id: rule.id },
                    ));
                }
            }
        }

        matches
    }

    fn fuzzy_pass(
        &self,
        transactions: &[Transaction],
        entries: &[LedgerEntry],
        txn_matched: &mut [bool],
        entry_matched: &mut [bool],
    ) -> Vec<ReconciliationMatch> {
        let mut matches = Vec::new();

        for (ti, txn) in transactions.iter().enumerate() {
            if txn_matched[ti] {
                continue;
            }

            let mut best: Option<(usize, u8)> = None;
            for (ei, entry) in entries.iter().enumerate() {
                if entry_matched[ei] {
                    continue;
                }
                let confidence = self.fuzzy.confidence(txn, entry);
                if best.map_or(true, |(_, top)| confidence > top) {
                    best = Some((ei, confidence));
                }
            }

            match best {
                Some((ei, confidence)) if confidence >= self.config.fuzzy_threshold => {
                    let entry = &entries[ei];
                    let score = self.fuzzy.score(txn, entry);
                    tracing::debug!(
                        transaction = %txn.id,
                        entry = %entry.id,
                        confidence,
                        "fuzzy match"
                    );
                    txn_matched[ti] = true;
                    entry_matched[ei] = true;
                    matches.push(ReconciliationMatch::new(
                        txn.clone(),
                        entry.clone(),
                        confidence,
                        score.summary(),
                        MatchMethod::Fuzzy,
                    ));
                }
                Some((_, confidence)) => {
                    tracing::debug!(
                        transaction = %txn.id,
                        best = confidence,
                        threshold = self.config.fuzzy_threshold,
                        "no fuzzy candidate above threshold"
                    );
                }
                None => {}
            }
        }

        matches
    }
}

/// Enabled rules ordered by descending priority, keeping input order on ties
pub fn active_rules(rules: &[ReconciliationRule]) -> Vec<&ReconciliationRule> {
    let mut active: Vec<&ReconciliationRule> = rules.iter().filter(|r| r.enabled).collect();
    active.sort_by(|a, b| b.priority.cmp(&a.priority));
    active
}
