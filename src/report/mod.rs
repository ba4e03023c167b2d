//! Audit reports: per-database summaries with text and JSON renderings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::core::database::well_known_owner;
use crate::core::{Classification, DatabaseKind, DecodedEntry, ExpiryTier, Finding, FindingDetail};
use crate::export::ExportedArtifact;
use crate::formats::esl::{SignatureList, SignatureType};
use crate::hashing::sha256_digest;

/// Advisory about test keys shipped as production PKs (PKfail).
pub const UNTRUSTED_PK_ADVISORY_URL: &str = "https://www.kb.cert.org/vuls/id/455367";

/// Certificate recommended to replace a compromised or expiring PK.
pub const REPLACEMENT_PK_NAME: &str = "Windows OEM Devices PK";

/// Per-entry facts carried alongside the findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub entry_index: usize,
    pub list_index: usize,
    pub signature_type: SignatureType,
    pub owner: Uuid,
    pub owner_label: Option<String>,
    pub subject: Option<String>,
    pub not_valid_after: Option<DateTime<Utc>>,
    /// SHA-256 of the payload (certificate thumbprint or the digest itself)
    pub sha256: String,
    pub size: usize,
}

impl EntrySummary {
    pub fn from_decoded(entry_index: usize, decoded: &DecodedEntry<'_>) -> Self {
        let entry = decoded.entry();
        let certificate = decoded.certificate();
        let sha256 = match decoded {
            DecodedEntry::Certificate { .. } => sha256_digest(entry.payload()),
            DecodedEntry::Hash { .. } => hex::encode(entry.payload()),
        };
        Self {
            entry_index,
            list_index: decoded.list_index(),
            signature_type: entry.signature_type(),
            owner: entry.owner,
            owner_label: well_known_owner(&entry.owner).map(str::to_string),
            subject: certificate.map(|c| c.subject_common_name.clone()),
            not_valid_after: certificate.map(|c| c.not_valid_after),
            sha256,
            size: entry.payload().len(),
        }
    }
}

/// Outcome of auditing one signature database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseReport {
    pub database: DatabaseKind,
    pub evaluated_at: DateTime<Utc>,
    pub list_count: usize,
    pub entries: Vec<EntrySummary>,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ExportedArtifact>,
    #[serde(skip)]
    pub lists: Vec<SignatureList>,
}

impl DatabaseReport {
    /// Most severe classification among the findings
    pub fn worst(&self) -> Classification {
        self.findings
            .iter()
            .map(|f| f.classification)
            .max_by_key(Classification::severity)
            .unwrap_or(Classification::Valid)
    }

    pub fn has_problems(&self) -> bool {
        self.findings.iter().any(Finding::is_problem)
    }

    pub fn findings_with(&self, classification: Classification) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(move |f| f.classification == classification)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn entry(&self, index: Option<usize>) -> Option<&EntrySummary> {
        index.and_then(|i| self.entries.get(i))
    }

    fn write_owner(&self, f: &mut fmt::Formatter<'_>, owner: Option<Uuid>) -> fmt::Result {
        if let Some(owner) = owner {
            match well_known_owner(&owner) {
                Some(label) => writeln!(f, "  The signature owner is {} ({})", owner, label),
                None => writeln!(f, "  The signature owner is {}", owner),
            }?;
        }
        Ok(())
    }

    fn write_certificate(&self, f: &mut fmt::Formatter<'_>, finding: &Finding) -> fmt::Result {
        let FindingDetail::Certificate {
            subject,
            not_valid_after,
            days_remaining,
            expiry,
            untrusted_match,
        } = &finding.detail
        else {
            return Ok(());
        };
        let kind = self.database;
        let index = finding.entry_index.unwrap_or_default();

        write!(f, "{} cert [{}]: {}", kind, index, subject)?;
        if finding.classification != Classification::Valid {
            write!(f, " ({})", finding.classification)?;
        }
        writeln!(f)?;

        let date = not_valid_after.date_naive();
        match expiry {
            ExpiryTier::Expired => writeln!(f, "  This {} cert expired on {}", kind, date)?,
            _ => writeln!(
                f,
                "  This {} cert will expire on {} ({} days)",
                kind, date, days_remaining
            )?,
        }
        if let Some(entry) = self.entry(finding.entry_index) {
            writeln!(f, "  SHA-256 {}", entry.sha256)?;
        }
        self.write_owner(f, finding.owner)?;

        if let Some(marker) = untrusted_match {
            writeln!(
                f,
                "  This {} cert was issued with an untrusted key (subject contains \"{}\")",
                kind, marker
            )?;
            writeln!(f, "  Go to {} for more info", UNTRUSTED_PK_ADVISORY_URL)?;
        }

        match kind {
            DatabaseKind::Pk
                if untrusted_match.is_some()
                    || matches!(expiry, ExpiryTier::Critical | ExpiryTier::Expired) =>
            {
                writeln!(
                    f,
                    "  Consider replacing this cert with the {} cert",
                    REPLACEMENT_PK_NAME
                )?;
            }
            DatabaseKind::Kek if *expiry == ExpiryTier::Expired => {
                writeln!(f, "  Consider removing this KEK cert")?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl fmt::Display for DatabaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} signature list(s), {} entr{}",
            self.database,
            self.list_count,
            self.entries.len(),
            if self.entries.len() == 1 { "y" } else { "ies" }
        )?;

        for finding in &self.findings {
            match &finding.detail {
                FindingDetail::Certificate { .. } => self.write_certificate(f, finding)?,
                FindingDetail::Hash { digest } => {
                    writeln!(
                        f,
                        "{} hash [{}]: {}",
                        self.database,
                        finding.entry_index.unwrap_or_default(),
                        digest
                    )?;
                    self.write_owner(f, finding.owner)?;
                }
                FindingDetail::MissingRequiredCert { required } => {
                    for name in required {
                        writeln!(f, "Consider adding the {} cert", name)?;
                    }
                }
            }
        }

        for artifact in &self.artifacts {
            writeln!(f, "Saved {}", artifact.path.display())?;
        }
        Ok(())
    }
}
