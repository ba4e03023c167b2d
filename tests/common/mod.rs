//! Common test utilities and helpers.
//!
//! Builders for raw signature databases, a table-driven certificate
//! decoder and real certificates generated with rcgen.

pub mod test_utils;

pub use test_utils::*;
