//! Decoded certificate fields and evaluator input entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::formats::esl::SignatureEntry;

/// Certificate fields relevant to Secure Boot policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCertificate {
    /// First common name of the subject
    pub subject_common_name: String,
    /// End of the validity period
    pub not_valid_after: DateTime<Utc>,
}

impl DecodedCertificate {
    pub fn new(subject_common_name: impl Into<String>, not_valid_after: DateTime<Utc>) -> Self {
        Self {
            subject_common_name: subject_common_name.into(),
            not_valid_after,
        }
    }
}

/// A signature entry paired with whatever was decoded from its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEntry<'a> {
    Certificate {
        list_index: usize,
        entry: &'a SignatureEntry,
        certificate: DecodedCertificate,
    },
    Hash {
        list_index: usize,
        entry: &'a SignatureEntry,
    },
}

impl<'a> DecodedEntry<'a> {
    pub fn entry(&self) -> &'a SignatureEntry {
        match self {
            DecodedEntry::Certificate { entry, .. } | DecodedEntry::Hash { entry, .. } => entry,
        }
    }

    pub fn list_index(&self) -> usize {
        match self {
            DecodedEntry::Certificate { list_index, .. } | DecodedEntry::Hash { list_index, .. } => {
                *list_index
            }
        }
    }

    pub fn certificate(&self) -> Option<&DecodedCertificate> {
        match self {
            DecodedEntry::Certificate { certificate, .. } => Some(certificate),
            DecodedEntry::Hash { .. } => None,
        }
    }
}
