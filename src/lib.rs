//! UEFI Secure Boot signature database auditing.
//!
//! Parses EFI signature lists from the PK, KEK and db variables, decodes
//! the X.509 certificates they carry and grades each entry against an
//! expiry and trust policy.

/// Audit pipeline tying sources, parsing and policy together
pub mod audit;
/// Core data types module
pub mod core;
pub mod error;
/// Certificate and hash list export
pub mod export;
/// Binary format parsers
pub mod formats;
pub mod hashing;
pub mod logging;
/// Expiry and trust policy evaluation
pub mod policy;
pub mod report;
/// Firmware variable sources
pub mod variables;
/// X.509 certificate decoding
pub mod x509;

pub use audit::{export_report, Auditor};
pub use crate::core::{Classification, DatabaseKind, Finding, FindingDetail};
pub use error::{AuditError, Result};
pub use formats::esl::{SignatureDatabase, SignatureList};
pub use policy::{PolicyEvaluator, PolicyThresholds};
pub use report::DatabaseReport;
