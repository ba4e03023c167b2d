//! Policy findings produced for signature database entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Expiration tier of a certificate, independent of trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryTier {
    Valid,
    Warning,
    Critical,
    Expired,
}

/// Outcome of evaluating one entry (or the database as a whole).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Valid,
    ExpiringWarning,
    ExpiringCritical,
    Expired,
    UntrustedIssuer,
    MissingRequiredCert,
}

impl Classification {
    /// Ordering used when summarising findings; higher is worse.
    pub fn severity(&self) -> u8 {
        match self {
            Classification::Valid => 0,
            Classification::ExpiringWarning => 1,
            Classification::ExpiringCritical => 2,
            Classification::MissingRequiredCert => 3,
            Classification::Expired => 4,
            Classification::UntrustedIssuer => 5,
        }
    }

    /// Whether the finding calls for action (warnings are informational)
    pub fn is_problem(&self) -> bool {
        self.severity() >= Classification::ExpiringCritical.severity()
    }
}

impl From<ExpiryTier> for Classification {
    fn from(tier: ExpiryTier) -> Self {
        match tier {
            ExpiryTier::Valid => Classification::Valid,
            ExpiryTier::Warning => Classification::ExpiringWarning,
            ExpiryTier::Critical => Classification::ExpiringCritical,
            ExpiryTier::Expired => Classification::Expired,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Classification::Valid => "valid",
            Classification::ExpiringWarning => "expiring (warning)",
            Classification::ExpiringCritical => "expiring (critical)",
            Classification::Expired => "expired",
            Classification::UntrustedIssuer => "untrusted issuer",
            Classification::MissingRequiredCert => "missing required certificate",
        };
        f.write_str(s)
    }
}

/// Classification-specific data needed to render a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingDetail {
    Hash {
        /// Hex-encoded digest
        digest: String,
    },
    Certificate {
        subject: String,
        not_valid_after: DateTime<Utc>,
        /// Whole days left, counted from the start of the evaluation day
        days_remaining: i64,
        expiry: ExpiryTier,
        /// Untrusted marker found in the subject, if any
        untrusted_match: Option<String>,
    },
    MissingRequiredCert {
        required: Vec<String>,
    },
}

/// A single policy finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Position in the database's flattened entry order
    pub entry_index: Option<usize>,
    /// Index of the signature list holding the entry
    pub list_index: Option<usize>,
    pub owner: Option<Uuid>,
    pub classification: Classification,
    pub detail: FindingDetail,
}

impl Finding {
    pub fn is_problem(&self) -> bool {
        self.classification.is_problem()
    }

    /// Subject common name for certificate findings
    pub fn subject(&self) -> Option<&str> {
        match &self.detail {
            FindingDetail::Certificate { subject, .. } => Some(subject),
            _ => None,
        }
    }

    /// Expiration tier for certificate findings, even when trust dominates
    pub fn expiry(&self) -> Option<ExpiryTier> {
        match &self.detail {
            FindingDetail::Certificate { expiry, .. } => Some(*expiry),
            _ => None,
        }
    }
}
