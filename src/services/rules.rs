//! Rule evaluation
//!
//! Decides whether a rule pairs a bank transaction with a ledger entry.
//! Conditions are AND-ed and evaluation stops at the first failing one.
//! Missing fields read as empty text; evaluation never fails.

use chrono::NaiveDate;

use super::import::parse_date;
use crate::models::{
    Condition, ConditionField, ConditionValue, LedgerEntry, Money, ReconciliationRule, Transaction,
};

/// Evaluates reconciliation rules against candidate pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Check whether every condition of `rule` holds for the pair
    ///
    /// A rule without conditions never matches.
    pub fn evaluate(
        &self,
        rule: &ReconciliationRule,
        transaction: &Transaction,
        entry: &LedgerEntry,
    ) -> bool {
        !rule.conditions.is_empty()
            && rule
                .conditions
                .iter()
                .all(|c| self.evaluate_condition(c, transaction, entry))
    }

    /// Check a single condition
    pub fn evaluate_condition(
        &self,
        condition: &Condition,
        transaction: &Transaction,
        entry: &LedgerEntry,
    ) -> bool {
        match condition {
            Condition::Equals { field, value } => {
                equals(*field, value, &Side::Bank(transaction))
                    && equals(*field, value, &Side::Ledger(entry))
            }
            Condition::Contains { field, value } => {
                text_test(*field, value, transaction, entry, |s, lit| s.contains(lit))
            }
            Condition::StartsWith { field, value } => {
                text_test(*field, value, transaction, entry, |s, lit| s.starts_with(lit))
            }
            Condition::EndsWith { field, value } => {
                text_test(*field, value, transaction, entry, |s, lit| s.ends_with(lit))
            }
            Condition::WithinDays { days } => {
                (transaction.date - entry.date).num_days().abs() <= i64::from(*days)
            }
            Condition::WithinAmount { tolerance } => {
                let tolerance = Money::from_f64(tolerance.abs());
                transaction.amount.abs_diff(entry.magnitude()) <= tolerance
            }
        }
    }
}

/// One side of a candidate pair
enum Side<'a> {
    Bank(&'a Transaction),
    Ledger(&'a LedgerEntry),
}

impl Side<'_> {
    fn amount(&self) -> Money {
        match self {
            Side::Bank(t) => t.amount,
            Side::Ledger(e) => e.magnitude(),
        }
    }

    fn date(&self) -> NaiveDate {
        match self {
            Side::Bank(t) => t.date,
            Side::Ledger(e) => e.date,
        }
    }

    /// Field rendered as text; amounts are unsigned magnitudes
    fn text(&self, field: ConditionField) -> String {
        match field {
            ConditionField::Amount => self.amount().to_string(),
            ConditionField::Date => self.date().format("%Y-%m-%d").to_string(),
            ConditionField::Description => match self {
                Side::Bank(t) => t.description.clone(),
                Side::Ledger(e) => e.description.clone(),
            },
            ConditionField::Reference => match self {
                Side::Bank(t) => t.reference.clone().unwrap_or_default(),
                Side::Ledger(e) => e.reference.clone().unwrap_or_default(),
            },
        }
    }
}

fn equals(field: ConditionField, value: &ConditionValue, side: &Side<'_>) -> bool {
    match field {
        ConditionField::Amount => {
            let literal = match value {
                ConditionValue::Number(n) if n.is_finite() => Some(Money::from_f64(*n)),
                ConditionValue::Number(_) => None,
                ConditionValue::Text(s) => Money::parse_lenient(s),
            };
            literal.is_some_and(|lit| lit.abs() == side.amount())
        }
        ConditionField::Date => {
            parse_date(&value.as_text()).is_some_and(|lit| lit == side.date())
        }
        ConditionField::Description | ConditionField::Reference => {
            side.text(field) == value.as_text()
        }
    }
}

fn text_test(
    field: ConditionField,
    value: &ConditionValue,
    transaction: &Transaction,
    entry: &LedgerEntry,
    test: impl Fn(&str, &str) -> bool,
) -> bool {
    let literal = value.as_text().to_lowercase();
    [Side::Bank(transaction), Side::Ledger(entry)]
        .iter()
        .all(|side| test(&side.text(field).to_lowercase(), &literal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryDirection;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pair() -> (Transaction, LedgerEntry) {
        let txn = Transaction::new(date(2024, 3, 1), "ACME Payment 42", Money::from_cents(-12500))
            .with_reference("INV-42");
        let entry = LedgerEntry::new(
            date(2024, 3, 3),
            "acme payment",
            Money::from_cents(-12500),
            EntryDirection::Debit,
            "Accounts Payable",
        )
        .with_reference("INV-42");
        (txn, entry)
    }

    fn check(condition: Condition) -> bool {
        let (txn, entry) = pair();
        RuleEngine::new().evaluate_condition(&condition, &txn, &entry)
    }

    #[test]
    fn test_equals_requires_both_sides() {
        assert!(check(Condition::Equals {
            field: ConditionField::Reference,
            value: "INV-42".into(),
        }));
        // Only the ledger description equals the literal
        assert!(!check(Condition::Equals {
            field: ConditionField::Description,
            value: "acme payment".into(),
        }));
    }

    #[test]
    fn test_equals_amount_number_and_text() {
        assert!(check(Condition::Equals {
            field: ConditionField::Amount,
            value: 125.0.into(),
        }));
        assert!(check(Condition::Equals {
            field: ConditionField::Amount,
            value: "$125.00".into(),
        }));
        assert!(!check(Condition::Equals {
            field: ConditionField::Amount,
            value: 125.01.into(),
        }));
    }

    #[test]
    fn test_equals_date_requires_same_day_on_both() {
        assert!(!check(Condition::Equals {
            field: ConditionField::Date,
            value: "2024-03-01".into(),
        }));
    }

    #[test]
    fn test_string_operators_case_insensitive() {
        assert!(check(Condition::Contains {
            field: ConditionField::Description,
            value: "PAYMENT".into(),
        }));
        assert!(check(Condition::StartsWith {
            field: ConditionField::Description,
            value: "Acme".into(),
        }));
        assert!(check(Condition::EndsWith {
            field: ConditionField::Reference,
            value: "-42".into(),
        }));
        assert!(!check(Condition::EndsWith {
            field: ConditionField::Description,
            value: "42".into(),
        }));
    }

    #[test]
    fn test_missing_reference_reads_as_empty() {
        let (mut txn, entry) = pair();
        txn.reference = None;
        let condition = Condition::Contains {
            field: ConditionField::Reference,
            value: "INV".into(),
        };
        assert!(!RuleEngine::new().evaluate_condition(&condition, &txn, &entry));
    }

    #[test]
    fn test_within_days() {
        assert!(check(Condition::WithinDays { days: 2 }));
        assert!(!check(Condition::WithinDays { days: 1 }));
    }

    #[test]
    fn test_within_amount_uses_magnitudes() {
        let (txn, mut entry) = pair();
        entry.amount = Money::from_cents(-12600);
        let engine = RuleEngine::new();
        assert!(engine.evaluate_condition(&Condition::WithinAmount { tolerance: 1.0 }, &txn, &entry));
        assert!(!engine.evaluate_condition(&Condition::WithinAmount { tolerance: 0.99 }, &txn, &entry));
    }

    #[test]
    fn test_rule_is_conjunction() {
        let (txn, entry) = pair();
        let engine = RuleEngine::new();

        let rule = ReconciliationRule::new("ACME", 10)
            .with_condition(Condition::Contains {
                field: ConditionField::Description,
                value: "acme".into(),
            })
            .with_condition(Condition::WithinDays { days: 3 });
        assert!(engine.evaluate(&rule, &txn, &entry));

        let strict = rule.with_condition(Condition::WithinDays { days: 0 });
        assert!(!engine.evaluate(&strict, &txn, &entry));
    }

    #[test]
    fn test_rule_without_conditions_never_matches() {
        let (txn, entry) = pair();
        let rule = ReconciliationRule::new("empty", 1);
        assert!(!RuleEngine::new().evaluate(&rule, &txn, &entry));
    }
}
