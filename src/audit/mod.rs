//! Audit pipeline: fetch, parse, decode and evaluate signature databases.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::core::{DatabaseKind, DecodedEntry};
use crate::error::{AuditError, Result};
use crate::export::export_database;
use crate::formats::esl::SignatureDatabase;
use crate::policy::{PolicyEvaluator, PolicyThresholds};
use crate::report::{DatabaseReport, EntrySummary};
use crate::span_trace;
use crate::variables::VariableSource;
use crate::x509::{CertificateDecoder, X509Decoder};

/// Runs the audit pipeline with a certificate decoder and policy.
#[derive(Debug, Clone)]
pub struct Auditor<D = X509Decoder> {
    decoder: D,
    evaluator: PolicyEvaluator,
}

impl Auditor<X509Decoder> {
    /// Auditor using the `x509-parser` backed decoder
    pub fn new(thresholds: PolicyThresholds) -> Result<Self> {
        Self::with_decoder(X509Decoder, thresholds)
    }
}

impl<D: CertificateDecoder> Auditor<D> {
    pub fn with_decoder(decoder: D, thresholds: PolicyThresholds) -> Result<Self> {
        Ok(Self {
            decoder,
            evaluator: PolicyEvaluator::new(thresholds)?,
        })
    }

    /// Decode every certificate of `database`; the first failure aborts.
    pub fn decode<'a>(
        &self,
        kind: DatabaseKind,
        database: &'a SignatureDatabase,
    ) -> Result<Vec<DecodedEntry<'a>>> {
        database
            .entries()
            .enumerate()
            .map(|(entry_index, (list_index, entry))| match entry.certificate_der() {
                Some(der) => {
                    let certificate =
                        self.decoder
                            .decode_der(der)
                            .map_err(|source| AuditError::Decode {
                                database: kind,
                                entry_index,
                                source,
                            })?;
                    debug!(
                        database = %kind,
                        entry_index,
                        subject = %certificate.subject_common_name,
                        "Decoded certificate"
                    );
                    Ok(DecodedEntry::Certificate {
                        list_index,
                        entry,
                        certificate,
                    })
                }
                None => Ok(DecodedEntry::Hash { list_index, entry }),
            })
            .collect()
    }

    /// Audit an in-memory signature database.
    pub fn inspect(
        &self,
        kind: DatabaseKind,
        data: &[u8],
        now: DateTime<Utc>,
    ) -> Result<DatabaseReport> {
        let span = span_trace!("inspect", database = %kind, size = data.len());
        let _guard = span.enter();

        let database = SignatureDatabase::parse(data).map_err(|source| AuditError::Parse {
            database: kind,
            source,
        })?;
        let decoded = self.decode(kind, &database)?;
        let findings = self.evaluator.evaluate(kind, &decoded, now);
        let entries: Vec<EntrySummary> = decoded
            .iter()
            .enumerate()
            .map(|(i, d)| EntrySummary::from_decoded(i, d))
            .collect();

        let report = DatabaseReport {
            database: kind,
            evaluated_at: now,
            list_count: database.lists().len(),
            entries,
            findings,
            artifacts: Vec::new(),
            lists: database.lists().to_vec(),
        };

        if report.has_problems() {
            warn!(database = %kind, worst = %report.worst(), "Signature database has problems");
        } else {
            info!(
                database = %kind,
                entries = report.entries.len(),
                "Signature database passed policy"
            );
        }
        Ok(report)
    }

    /// Fetch `kind` from `source` and audit it.
    pub fn audit(
        &self,
        kind: DatabaseKind,
        source: &dyn VariableSource,
        now: DateTime<Utc>,
    ) -> Result<DatabaseReport> {
        let data = source.get_variable(kind.variable_name(), kind.namespace())?;
        self.inspect(kind, &data, now)
    }

    /// Audit several databases in parallel; reports keep the order of `kinds`.
    ///
    /// When several databases fail, the error of the earliest one in `kinds`
    /// is returned.
    pub fn audit_all(
        &self,
        kinds: &[DatabaseKind],
        source: &dyn VariableSource,
        now: DateTime<Utc>,
    ) -> Result<Vec<DatabaseReport>> {
        let results: Vec<Result<DatabaseReport>> = kinds
            .par_iter()
            .map(|kind| self.audit(*kind, source, now))
            .collect();
        results.into_iter().collect()
    }
}

/// Save the report's certificates and hash lists into `dir`.
pub fn export_report(report: &mut DatabaseReport, dir: &Path) -> Result<()> {
    let artifacts = export_database(report.database, &report.lists, dir)?;
    report.artifacts = artifacts;
    Ok(())
}
