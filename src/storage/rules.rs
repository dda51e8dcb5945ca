//! Rule repositories
//!
//! Rules are stored as `{ "rules": [...] }` in JSON, or the equivalent YAML
//! document when the file extension is `.yaml`/`.yml`.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, ReconResult};
use crate::models::ReconciliationRule;

use super::file_io::{write_json_atomic, write_yaml_atomic};
use super::RuleRepository;

/// Serializable rule file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RuleData {
    #[serde(default)]
    rules: Vec<ReconciliationRule>,
}

/// Rule repository backed by a JSON or YAML file
pub struct RuleFileRepository {
    path: PathBuf,
}

impl RuleFileRepository {
    /// Create a repository for the given file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn is_yaml(&self) -> bool {
        matches!(
            self.path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        )
    }

    fn read(&self) -> ReconResult<RuleData> {
        if !self.path.exists() {
            return Ok(RuleData::default());
        }

        let file = File::open(&self.path).map_err(|e| {
            ReconError::Storage(format!("Failed to open {}: {}", self.path.display(), e))
        })?;
        let reader = BufReader::new(file);

        if self.is_yaml() {
            Ok(serde_yaml::from_reader(reader)?)
        } else {
            Ok(serde_json::from_reader(reader)?)
        }
    }
}

impl RuleRepository for RuleFileRepository {
    fn load_rules(&self) -> ReconResult<Vec<ReconciliationRule>> {
        let data = self.read()?;
        validate_all(&data.rules)?;
        Ok(data.rules)
    }

    fn save_rules(&self, rules: &[ReconciliationRule]) -> ReconResult<()> {
        validate_all(rules)?;
        let data = RuleData {
            rules: rules.to_vec(),
        };
        if self.is_yaml() {
            write_yaml_atomic(&self.path, &data)
        } else {
            write_json_atomic(&self.path, &data)
        }
    }
}

/// In-memory rule repository
#[derive(Default)]
pub struct MemoryRuleRepository {
    rules: RwLock<Vec<ReconciliationRule>>,
}

impl MemoryRuleRepository {
    /// Create a repository holding the given rules
    pub fn new(rules: Vec<ReconciliationRule>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }
}

impl RuleRepository for MemoryRuleRepository {
    fn load_rules(&self) -> ReconResult<Vec<ReconciliationRule>> {
        let rules = self.rules.read().map_err(|e| {
            ReconError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(rules.clone())
    }

    fn save_rules(&self, new_rules: &[ReconciliationRule]) -> ReconResult<()> {
        validate_all(new_rules)?;
        let mut rules = self.rules.write().map_err(|e| {
            ReconError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        *rules = new_rules.to_vec();
        Ok(())
    }
}

fn validate_all(rules: &[ReconciliationRule]) -> ReconResult<()> {
    for rule in rules {
        rule.validate()
            .map_err(|e| ReconError::Rule(format!("'{}': {}", rule.name, e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Condition, ConditionField, ConditionValue, RuleAction};
    use tempfile::TempDir;

    fn sample_rules() -> Vec<ReconciliationRule> {
        vec![
            ReconciliationRule::new("Rent", 100)
                .with_condition(Condition::Contains {
                    field: ConditionField::Description,
                    value: ConditionValue::from("rent"),
                })
                .with_condition(Condition::WithinDays { days: 3 }),
            ReconciliationRule::new("Exact amount", 50)
                .with_condition(Condition::Equals {
                    field: ConditionField::Amount,
                    value: ConditionValue::Number(5000.0),
                })
                .with_action(RuleAction::Flag {
                    reason: "large payment".into(),
                }),
        ]
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let repo = RuleFileRepository::new(temp_dir.path().join("rules.json"));
        assert!(repo.load_rules().unwrap().is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let repo = RuleFileRepository::new(temp_dir.path().join("rules.json"));
        let rules = sample_rules();

        repo.save_rules(&rules).unwrap();
        assert_eq!(repo.load_rules().unwrap(), rules);

        let raw = std::fs::read_to_string(repo.path()).unwrap();
        assert!(raw.contains("\"operator\": \"withinDays\""));
    }

    #[test]
    fn test_yaml_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let repo = RuleFileRepository::new(temp_dir.path().join("rules.yaml"));
        let rules = sample_rules();

        repo.save_rules(&rules).unwrap();
        assert_eq!(repo.load_rules().unwrap(), rules);

        let raw = std::fs::read_to_string(repo.path()).unwrap();
        assert!(raw.contains("operator: contains"));
    }

    #[test]
    fn test_hand_written_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rules.yml");
        std::fs::write(
            &path,
            "rules:\n  - name: Payroll\n    priority: 10\n    conditions:\n      - operator: startsWith\n        field: description\n        value: PAYROLL\n      - operator: withinAmount\n        value: 0.5\n",
        )
        .unwrap();

        let rules = RuleFileRepository::new(path).load_rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].priority, 10);
        assert_eq!(rules[0].conditions[1], Condition::WithinAmount { tolerance: 0.5 });
    }

    #[test]
    fn test_string_thresholds_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"{"rules": [{"name": "Rent", "conditions": [
                {"operator": "withinDays", "field": "date", "value": "3"},
                {"operator": "withinAmount", "value": "0.5"}
            ]}]}"#,
        )
        .unwrap();

        let rules = RuleFileRepository::new(path).load_rules().unwrap();
        assert_eq!(rules[0].conditions[0], Condition::WithinDays { days: 3 });
        assert_eq!(rules[0].conditions[1], Condition::WithinAmount { tolerance: 0.5 });
    }

    #[test]
    fn test_invalid_rule_rejected_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rules.json");
        std::fs::write(&path, r#"{"rules": [{"name": "No conditions"}]}"#).unwrap();

        let err = RuleFileRepository::new(path).load_rules().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("No conditions"));
    }

    #[test]
    fn test_memory_repository() {
        let repo = MemoryRuleRepository::default();
        assert!(repo.load_rules().unwrap().is_empty());
        repo.save_rules(&sample_rules()).unwrap();
        assert_eq!(repo.load_rules().unwrap().len(), 2);
    }
}
