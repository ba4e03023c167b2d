//! Error types for sbaudit.
//!
//! Each module owns a focused error enum; this module composes them into a
//! single error for the audit pipeline. Every failure is fatal for the
//! database being audited: nothing is skipped and no partial report is
//! returned.

use thiserror::Error;

use crate::core::DatabaseKind;
use crate::export::ExportError;
use crate::formats::esl::EslError;
use crate::policy::PolicyError;
use crate::variables::VariableError;
use crate::x509::DecodeError;

/// Main error type for audit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Raw variable could not be obtained
    #[error(transparent)]
    Variable(#[from] VariableError),

    /// Signature database structure is invalid
    #[error("Invalid {database} signature database: {source}")]
    Parse {
        database: DatabaseKind,
        #[source]
        source: EslError,
    },

    /// A certificate payload could not be decoded
    #[error("Invalid certificate in {database} entry {entry_index}: {source}")]
    Decode {
        database: DatabaseKind,
        entry_index: usize,
        #[source]
        source: DecodeError,
    },

    /// Policy configuration problems
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Artifact export failures
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Report serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;
