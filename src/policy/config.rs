//! Configuration for the Secure Boot policy evaluator.
//!
//! Thresholds and well-known names are plain data so policy updates never
//! touch parsing or evaluation code. Defaults mirror the current Microsoft
//! Secure Boot guidance; any field can be overridden from a JSON file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Current Microsoft KEK certificate every KEK database should carry.
pub const MICROSOFT_KEK_2023_NAME: &str = "Microsoft Corporation KEK 2K CA 2023";

/// Errors raised while loading or validating policy configuration.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Invalid policy: {0}")]
    Invalid(String),

    #[error("Failed to build subject matcher: {0}")]
    Matcher(String),

    #[error("Failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse policy file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Expiration thresholds and trust rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyThresholds {
    /// Fewer days remaining than this is critical (default: 60).
    pub critical_days: i64,
    /// Fewer days remaining than this is a warning (default: 120).
    pub warning_days: i64,
    /// Subject names of which at least one must be present in KEK.
    pub required_subject_names: BTreeSet<String>,
    /// Substrings marking a PK subject as untrusted.
    pub untrusted_subject_substrings: Vec<String>,
}

impl Default for PolicyThresholds {
    fn default() -> Self {
        Self {
            critical_days: 60,
            warning_days: 120,
            required_subject_names: BTreeSet::from([MICROSOFT_KEK_2023_NAME.to_string()]),
            untrusted_subject_substrings: vec!["DO NOT SHIP".to_string(), "DO NOT TRUST".to_string()],
        }
    }
}

impl PolicyThresholds {
    /// Parse thresholds from a JSON document; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        let thresholds: Self = serde_json::from_str(json)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Load thresholds from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PolicyError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.critical_days < 0 || self.warning_days < 0 {
            return Err(PolicyError::Invalid(
                "day thresholds must not be negative".to_string(),
            ));
        }
        if self.critical_days > self.warning_days {
            return Err(PolicyError::Invalid(format!(
                "critical_days ({}) exceeds warning_days ({})",
                self.critical_days, self.warning_days
            )));
        }
        if self.untrusted_subject_substrings.iter().any(String::is_empty) {
            return Err(PolicyError::Invalid(
                "untrusted subject substrings must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
