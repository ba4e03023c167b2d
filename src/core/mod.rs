//! Core data types for Secure Boot database inspection.
//!
//! Database identities, decoded certificate fields and the findings the
//! policy evaluator produces.

pub mod certificate;
pub mod database;
pub mod finding;

pub use certificate::{DecodedCertificate, DecodedEntry};
pub use database::DatabaseKind;
pub use finding::{Classification, ExpiryTier, Finding, FindingDetail};
