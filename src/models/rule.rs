//! Reconciliation rule model
//!
//! Rules are authored and persisted by the host application. Each rule holds
//! an AND-ed list of conditions and a list of actions. Conditions are a closed
//! set of operators, each carrying only the payload it needs.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::RuleId;

/// Field of a (transaction, ledger entry) pair a condition inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionField {
    Amount,
    Date,
    Description,
    Reference,
}

impl fmt::Display for ConditionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount => write!(f, "amount"),
            Self::Date => write!(f, "date"),
            Self::Description => write!(f, "description"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

/// Literal a condition compares against, stored as written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Number(f64),
    Text(String),
}

impl ConditionValue {
    /// Render the literal as text for string comparisons
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for ConditionValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(_) => write!(f, "{}", self.as_text()),
            Self::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A single rule condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", rename_all = "camelCase")]
pub enum Condition {
    /// Both sides' field equals the literal
    Equals {
        field: ConditionField,
        value: ConditionValue,
    },
    /// Both sides' field contains the literal (case-insensitive)
    Contains {
        field: ConditionField,
        value: ConditionValue,
    },
    /// Both sides' field starts with the literal (case-insensitive)
    StartsWith {
        field: ConditionField,
        value: ConditionValue,
    },
    /// Both sides' field ends with the literal (case-insensitive)
    EndsWith {
        field: ConditionField,
        value: ConditionValue,
    },
    /// Transaction and entry dates are at most `days` apart
    WithinDays {
        #[serde(rename = "value", deserialize_with = "threshold::days")]
        days: u32,
    },
    /// Transaction and entry amounts differ by at most `tolerance`
    WithinAmount {
        #[serde(rename = "value", deserialize_with = "threshold::tolerance")]
        tolerance: f64,
    },
}

/// Threshold literals may be persisted as numbers or numeric strings
mod threshold {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    use super::ConditionValue;

    fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match ConditionValue::deserialize(deserializer)? {
            ConditionValue::Number(n) => Ok(n),
            ConditionValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("expected a number, found \"{}\"", s))),
        }
    }

    /// Day counts compare against whole-day differences, so a fractional
    /// count is equivalent to its floor.
    pub fn days<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let n = number(deserializer)?;
        if !n.is_finite() || n < 0.0 || n > f64::from(u32::MAX) {
            return Err(D::Error::custom(format!("invalid day count: {}", n)));
        }
        Ok(n.floor() as u32)
    }

    /// Range checks happen in `ReconciliationRule::validate`
    pub fn tolerance<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        number(deserializer)
    }
}

impl Condition {
    /// Operator identifier as persisted
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Equals { .. } => "equals",
            Self::Contains { .. } => "contains",
            Self::StartsWith { .. } => "startsWith",
            Self::EndsWith { .. } => "endsWith",
            Self::WithinDays { .. } => "withinDays",
            Self::WithinAmount { .. } => "withinAmount",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { field, value }
            | Self::Contains { field, value }
            | Self::StartsWith { field, value }
            | Self::EndsWith { field, value } => {
                write!(f, "{} {} {}", field, self.operator(), value)
            }
            Self::WithinDays { days } => write!(f, "date withinDays {}", days),
            Self::WithinAmount { tolerance } => write!(f, "amount withinAmount {}", tolerance),
        }
    }
}

/// Action taken when a rule pairs a transaction with a ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuleAction {
    /// Accept the pairing and mark the transaction reconciled
    MarkReconciled,
    /// Accept the pairing but flag the transaction for review
    Flag { reason: String },
    /// Attach a note to the audit history
    Note { text: String },
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarkReconciled => write!(f, "mark reconciled"),
            Self::Flag { reason } => write!(f, "flag: {}", reason),
            Self::Note { text } => write!(f, "note: {}", text),
        }
    }
}

/// A user-configurable matching rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRule {
    /// Unique identifier
    #[serde(default)]
    pub id: RuleId,

    /// Display name, used as the match reason
    pub name: String,

    /// Disabled rules are skipped
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Higher priorities are evaluated first
    #[serde(default)]
    pub priority: i32,

    /// All must hold
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Applied to pairs this rule matches
    #[serde(default)]
    pub actions: Vec<RuleAction>,
}

fn default_enabled() -> bool {
    true
}

impl ReconciliationRule {
    /// Create a new enabled rule with no conditions
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            id: RuleId::new(),
            name: name.into(),
            enabled: true,
            priority,
            conditions: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Add a condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add an action
    pub fn with_action(mut self, action: RuleAction) -> Self {
        self.actions.push(action);
        self
    }

    /// First flag reason among the actions, if any
    pub fn flag_reason(&self) -> Option<&str> {
        self.actions.iter().find_map(|a| match a {
            RuleAction::Flag { reason } => Some(reason.as_str()),
            _ => None,
        })
    }

    /// Notes attached by this rule
    pub fn notes(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                RuleAction::Note { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Validate the rule definition
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        if self.name.trim().is_empty() {
            return Err(RuleValidationError::EmptyName);
        }

        if self.conditions.is_empty() {
            return Err(RuleValidationError::NoConditions);
        }

        for condition in &self.conditions {
            match condition {
                Condition::WithinAmount { tolerance } if !tolerance.is_finite() || *tolerance < 0.0 => {
                    return Err(RuleValidationError::InvalidTolerance(*tolerance));
                }
                Condition::Equals { value: ConditionValue::Number(n), .. }
                | Condition::Contains { value: ConditionValue::Number(n), .. }
                | Condition::StartsWith { value: ConditionValue::Number(n), .. }
                | Condition::EndsWith { value: ConditionValue::Number(n), .. }
                    if !n.is_finite() =>
                {
                    return Err(RuleValidationError::NonFiniteLiteral);
                }
                _ => {}
            }
        }

        Ok(())
    }
}

impl fmt::Display for ReconciliationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (priority {})", self.name, self.priority)
    }
}

/// Validation errors for rules
#[derive(Debug, Clone, PartialEq)]
pub enum RuleValidationError {
    EmptyName,
    NoConditions,
    InvalidTolerance(f64),
    NonFiniteLiteral,
}

impl fmt::Display for RuleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Rule name cannot be empty"),
            Self::NoConditions => write!(f, "Rule must have at least one condition"),
            Self::InvalidTolerance(t) => write!(f, "Invalid amount tolerance: {}", t),
            Self::NonFiniteLiteral => write!(f, "Condition literal must be a finite number"),
        }
    }
}

impl std::error::Error for RuleValidationError {}
