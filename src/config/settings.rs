//! User settings for statement-recon
//!
//! Matching thresholds, import preferences and the default operator identity.

use serde::{Deserialize, Serialize};

use super::paths::ReconPaths;
use crate::error::ReconError;
use crate::models::Money;
use crate::storage::{read_json, write_json_atomic};

/// Tunable thresholds for matching and discrepancy detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum fuzzy confidence (0-100) for a fuzzy match to be accepted
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u8,

    /// Confidence bonus per point of rule priority
    #[serde(default = "default_rule_priority_weight")]
    pub rule_priority_weight: u32,

    /// Matched pairs further apart than this many days get a date_mismatch
    #[serde(default = "default_date_mismatch_days")]
    pub date_mismatch_days: i64,

    /// Amount mismatches above this are high severity (stored in cents)
    #[serde(default = "default_high_severity_amount")]
    pub high_severity_amount: Money,

    /// Skip date_mismatch for transactions whose date was estimated at import
    #[serde(default)]
    pub ignore_estimated_dates: bool,
}

fn default_fuzzy_threshold() -> u8 {
    70
}

fn default_rule_priority_weight() -> u32 {
    5
}

fn default_date_mismatch_days() -> i64 {
    7
}

fn default_high_severity_amount() -> Money {
    Money::from_units_cents(1000, 0)
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            rule_priority_weight: default_rule_priority_weight(),
            date_mismatch_days: default_date_mismatch_days(),
            high_severity_amount: default_high_severity_amount(),
            ignore_estimated_dates: false,
        }
    }
}

impl MatchingConfig {
    /// Check the thresholds are usable
    pub fn validate(&self) -> Result<(), ReconError> {
        if self.fuzzy_threshold > 100 {
            return Err(ReconError::Config(format!(
                "fuzzy_threshold must be between 0 and 100, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.date_mismatch_days < 0 {
            return Err(ReconError::Config(format!(
                "date_mismatch_days cannot be negative, got {}",
                self.date_mismatch_days
            )));
        }
        Ok(())
    }
}

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Operator identity recorded in history when none is given
    #[serde(default = "default_operator")]
    pub default_operator: String,

    /// Statement delimiter override; auto-detected when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,

    /// Matching thresholds
    #[serde(default)]
    pub matching: MatchingConfig,
}

fn default_schema_version() -> u32 {
    1
}

fn default_operator() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "system".to_string())
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_operator: default_operator(),
            delimiter: None,
            matching: MatchingConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    ///
    /// Defaults are not written back; the caller decides when to persist.
    pub fn load_or_create(paths: &ReconPaths) -> Result<Self, ReconError> {
        let settings: Settings = read_json(paths.settings_file())?;
        settings.matching.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ReconPaths) -> Result<(), ReconError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}
