//! Rule display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::truncate;
use crate::models::ReconciliationRule;

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Priority")]
    priority: i32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "On")]
    enabled: String,
    #[tabled(rename = "Conditions")]
    conditions: String,
    #[tabled(rename = "Actions")]
    actions: String,
}

/// Format rules as a table in evaluation order (highest priority first)
pub fn format_rule_table(rules: &[ReconciliationRule]) -> String {
    if rules.is_empty() {
        return "No rules defined.".to_string();
    }

    let mut sorted: Vec<&ReconciliationRule> = rules.iter().collect();
    sorted.sort_by(|a, b| b.priority.cmp(&a.priority));

    let rows = sorted.into_iter().map(|r| RuleRow {
        priority: r.priority,
        name: truncate(&r.name, 30),
        enabled: if r.enabled { "yes" } else { "no" }.to_string(),
        conditions: r
            .conditions
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" AND "),
        actions: r
            .actions
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Condition, ConditionField};

    #[test]
    fn test_rule_table() {
        let mut off = ReconciliationRule::new("Old rent", 1)
            .with_condition(Condition::WithinDays { days: 2 });
        off.enabled = false;
        let rent = ReconciliationRule::new("Rent", 50).with_condition(Condition::Contains {
            field: ConditionField::Description,
            value: "rent".into(),
        });

        let table = format_rule_table(&[off, rent]);
        assert!(table.find("Rent").unwrap() < table.find("Old rent").unwrap());
        assert!(table.contains("no"));
        assert_eq!(format_rule_table(&[]), "No rules defined.");
    }
}
