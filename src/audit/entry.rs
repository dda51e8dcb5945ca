//! History entry data structures
//!
//! Defines the reconciliation actions that are recorded and the entry format
//! itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{HistoryEntryId, SessionId};

/// Kinds of reconciliation actions that are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// A transaction was paired with a ledger entry
    Matched,
    /// A transaction was left unpaired after both passes
    Unmatched,
    /// A statement file was imported
    Imported,
    /// A rule produced a match
    RuleApplied,
    /// An anomaly was detected
    DiscrepancyFound,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryAction::Matched => write!(f, "MATCHED"),
            HistoryAction::Unmatched => write!(f, "UNMATCHED"),
            HistoryAction::Imported => write!(f, "IMPORTED"),
            HistoryAction::RuleApplied => write!(f, "RULE_APPLIED"),
            HistoryAction::DiscrepancyFound => write!(f, "DISCREPANCY_FOUND"),
        }
    }
}

/// A single append-only history record
///
/// Entries are never updated or deleted; corrections are recorded as new
/// entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier
    pub id: HistoryEntryId,

    /// Reconciliation session this entry belongs to
    pub session_id: SessionId,

    /// What happened
    pub action: HistoryAction,

    /// Who did it
    pub operator: String,

    /// When it happened (UTC)
    pub timestamp: DateTime<Utc>,

    /// Structured detail payload
    #[serde(default)]
    pub details: serde_json::Value,
}

impl HistoryEntry {
    /// Create a new entry stamped with the current time
    pub fn new<T: Serialize>(
        session_id: SessionId,
        action: HistoryAction,
        operator: impl Into<String>,
        details: &T,
    ) -> Self {
        Self {
            id: HistoryEntryId::new(),
            session_id,
            action,
            operator: operator.into(),
            timestamp: Utc::now(),
            details: serde_json::to_value(details).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} by {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.session_id,
            self.action,
            self.operator
        );

        if let Some(summary) = self.details.get("summary").and_then(|v| v.as_str()) {
            output.push_str(&format!("\n  {}", summary));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_display() {
        assert_eq!(HistoryAction::Matched.to_string(), "MATCHED");
        assert_eq!(HistoryAction::RuleApplied.to_string(), "RULE_APPLIED");
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&HistoryAction::DiscrepancyFound).unwrap();
        assert_eq!(json, "\"discrepancy_found\"");
    }

    #[test]
    fn test_new_entry() {
        let session = SessionId::new();
        let entry = HistoryEntry::new(
            session,
            HistoryAction::Imported,
            "alex",
            &json!({"filename": "jan.csv", "transactions": 12}),
        );

        assert_eq!(entry.session_id, session);
        assert_eq!(entry.action, HistoryAction::Imported);
        assert_eq!(entry.details["transactions"], 12);
    }

    #[test]
    fn test_serialization_round_trip() {
        let entry = HistoryEntry::new(SessionId::new(), HistoryAction::Matched, "alex", &json!({}));
        let json = serde_json::to_string(&entry).unwrap();
        let deserialized: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, entry);
    }

    #[test]
    fn test_human_readable_format() {
        let entry = HistoryEntry::new(
            SessionId::new(),
            HistoryAction::Unmatched,
            "alex",
            &json!({"summary": "2024-01-15 Coffee -4.50"}),
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("UNMATCHED"));
        assert!(formatted.contains("by alex"));
        assert!(formatted.contains("Coffee"));
    }
}
