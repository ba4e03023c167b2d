//! Trust and expiration policy over decoded signature database entries.
//!
//! Each entry is classified independently. Hash entries carry no expiry or
//! trust information and are always valid. Certificates are bucketed by
//! the number of whole days left before `notAfter`; PK subjects are also
//! screened for markers of test keys that were never meant to ship. KEK
//! databases get one extra cross-entry check once all entries are known:
//! at least one of the required certificates must be present.

pub mod config;

pub use config::{PolicyError, PolicyThresholds, MICROSOFT_KEK_2023_NAME};

use aho_corasick::AhoCorasick;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use tracing::{debug, info};

use crate::core::{
    Classification, DatabaseKind, DecodedEntry, ExpiryTier, Finding, FindingDetail,
};

const SECONDS_PER_DAY: i64 = 86_400;

/// Evaluates findings for decoded entries under a fixed set of thresholds.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    thresholds: PolicyThresholds,
    untrusted: Option<AhoCorasick>,
}

impl PolicyEvaluator {
    pub fn new(thresholds: PolicyThresholds) -> Result<Self, PolicyError> {
        thresholds.validate()?;
        let untrusted = if thresholds.untrusted_subject_substrings.is_empty() {
            None
        } else {
            let matcher = AhoCorasick::new(&thresholds.untrusted_subject_substrings)
                .map_err(|e| PolicyError::Matcher(e.to_string()))?;
            Some(matcher)
        };
        Ok(Self {
            thresholds,
            untrusted,
        })
    }

    pub fn thresholds(&self) -> &PolicyThresholds {
        &self.thresholds
    }

    /// Produce one finding per entry, in entry order, plus the KEK
    /// missing-certificate finding when it applies.
    pub fn evaluate(
        &self,
        kind: DatabaseKind,
        entries: &[DecodedEntry<'_>],
        now: DateTime<Utc>,
    ) -> Vec<Finding> {
        let mut findings: Vec<Finding> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| self.evaluate_entry(kind, index, entry, now))
            .collect();

        if kind == DatabaseKind::Kek {
            if let Some(missing) = self.missing_required(entries) {
                info!(
                    required = ?self.thresholds.required_subject_names,
                    "KEK database lacks every required certificate"
                );
                findings.push(missing);
            }
        }

        findings
    }

    fn evaluate_entry(
        &self,
        kind: DatabaseKind,
        index: usize,
        decoded: &DecodedEntry<'_>,
        now: DateTime<Utc>,
    ) -> Finding {
        let entry = decoded.entry();
        let (classification, detail) = match decoded {
            DecodedEntry::Hash { .. } => (
                Classification::Valid,
                FindingDetail::Hash {
                    digest: hex::encode(entry.payload()),
                },
            ),
            DecodedEntry::Certificate { certificate, .. } => {
                let (expiry, days_remaining) = self.expiry_tier(certificate.not_valid_after, now);
                let untrusted_match = match kind {
                    DatabaseKind::Pk => self.untrusted_match(&certificate.subject_common_name),
                    DatabaseKind::Kek | DatabaseKind::Db => None,
                };
                let classification = if untrusted_match.is_some() {
                    Classification::UntrustedIssuer
                } else {
                    Classification::from(expiry)
                };
                (
                    classification,
                    FindingDetail::Certificate {
                        subject: certificate.subject_common_name.clone(),
                        not_valid_after: certificate.not_valid_after,
                        days_remaining,
                        expiry,
                        untrusted_match,
                    },
                )
            }
        };

        debug!(
            database = %kind,
            entry_index = index,
            classification = ?classification,
            "Evaluated entry"
        );

        Finding {
            entry_index: Some(index),
            list_index: Some(decoded.list_index()),
            owner: Some(entry.owner),
            classification,
            detail,
        }
    }

    /// Bucket a certificate by its remaining lifetime.
    ///
    /// Expiry is decided on exact instants; the warning tiers count whole
    /// days from the start of the current UTC day with strict `<`.
    pub fn expiry_tier(&self, not_valid_after: DateTime<Utc>, now: DateTime<Utc>) -> (ExpiryTier, i64) {
        let days_remaining = days_remaining(not_valid_after, now);
        let tier = if not_valid_after < now {
            ExpiryTier::Expired
        } else if days_remaining < self.thresholds.critical_days {
            ExpiryTier::Critical
        } else if days_remaining < self.thresholds.warning_days {
            ExpiryTier::Warning
        } else {
            ExpiryTier::Valid
        };
        (tier, days_remaining)
    }

    fn untrusted_match(&self, subject: &str) -> Option<String> {
        let matcher = self.untrusted.as_ref()?;
        let m = matcher.find(subject)?;
        self.thresholds
            .untrusted_subject_substrings
            .get(m.pattern().as_usize())
            .cloned()
    }

    fn missing_required(&self, entries: &[DecodedEntry<'_>]) -> Option<Finding> {
        let required = &self.thresholds.required_subject_names;
        if required.is_empty() {
            return None;
        }
        let present = entries
            .iter()
            .filter_map(DecodedEntry::certificate)
            .any(|c| required.contains(&c.subject_common_name));
        if present {
            return None;
        }
        Some(Finding {
            entry_index: None,
            list_index: None,
            owner: None,
            classification: Classification::MissingRequiredCert,
            detail: FindingDetail::MissingRequiredCert {
                required: required.iter().cloned().collect(),
            },
        })
    }
}

/// Whole days between the start of `now`'s UTC day and `not_valid_after`, floored.
pub fn days_remaining(not_valid_after: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let start_of_day = Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN));
    (not_valid_after - start_of_day)
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY)
}

/// Evaluate entries with a one-off evaluator.
pub fn evaluate(
    kind: DatabaseKind,
    entries: &[DecodedEntry<'_>],
    now: DateTime<Utc>,
    thresholds: &PolicyThresholds,
) -> Result<Vec<Finding>, PolicyError> {
    let evaluator = PolicyEvaluator::new(thresholds.clone())?;
    Ok(evaluator.evaluate(kind, entries, now))
}
