//! Auditing variables read from efivarfs and dump files.

use std::fs;

use chrono::Duration;
use sbaudit::core::database::{EFI_GLOBAL_VARIABLE_GUID, EFI_IMAGE_SECURITY_DATABASE_GUID};
use sbaudit::core::{Classification, DatabaseKind};
use sbaudit::variables::{
    EfivarfsSource, FileSource, LayeredSource, MemorySource, VariableError, VariableSource,
};
use sbaudit::{AuditError, Auditor, PolicyThresholds};

use crate::common::{now, sha256_list, x509_list, TableDecoder, MICROSOFT_OWNER, OEM_OWNER};

fn with_attributes(data: &[u8]) -> Vec<u8> {
    let mut out = 0x27u32.to_le_bytes().to_vec();
    out.extend_from_slice(data);
    out
}

#[test]
fn test_audit_from_efivarfs() {
    let dir = tempfile::tempdir().unwrap();
    let mut decoder = TableDecoder::new();
    let kek = decoder.add("Microsoft Corporation KEK 2K CA 2023", now() + Duration::days(3000));

    let source = EfivarfsSource::new(dir.path());
    fs::write(
        source.variable_path("KEK", EFI_GLOBAL_VARIABLE_GUID),
        with_attributes(&x509_list(MICROSOFT_OWNER, &kek)),
    )
    .unwrap();

    let auditor = Auditor::with_decoder(decoder, PolicyThresholds::default()).unwrap();
    let report = auditor.audit(DatabaseKind::Kek, &source, now()).unwrap();
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].owner_label.as_deref(), Some("Microsoft"));
    assert!(!report.has_problems());
}

#[test]
fn test_db_uses_image_security_namespace() {
    let dir = tempfile::tempdir().unwrap();
    let source = EfivarfsSource::new(dir.path());
    let data = sha256_list(OEM_OWNER, &[[0xab; 32]]);

    // Stored under the global namespace, which is wrong for db.
    fs::write(
        source.variable_path("db", EFI_GLOBAL_VARIABLE_GUID),
        with_attributes(&data),
    )
    .unwrap();
    let auditor = Auditor::with_decoder(TableDecoder::new(), PolicyThresholds::default()).unwrap();
    assert!(matches!(
        auditor.audit(DatabaseKind::Db, &source, now()),
        Err(AuditError::Variable(VariableError::NotFound { .. }))
    ));

    fs::write(
        source.variable_path("db", EFI_IMAGE_SECURITY_DATABASE_GUID),
        with_attributes(&data),
    )
    .unwrap();
    let report = auditor.audit(DatabaseKind::Db, &source, now()).unwrap();
    assert_eq!(report.findings[0].classification, Classification::Valid);
}

#[test]
fn test_file_override_takes_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let mut decoder = TableDecoder::new();
    let stale = decoder.add("Old PK", now() - Duration::days(10));
    let fresh = decoder.add("New PK", now() + Duration::days(2000));

    let efivars = EfivarfsSource::new(dir.path());
    fs::write(
        efivars.variable_path("PK", EFI_GLOBAL_VARIABLE_GUID),
        with_attributes(&x509_list(OEM_OWNER, &stale)),
    )
    .unwrap();
    let dump = dir.path().join("PK.esl");
    fs::write(&dump, x509_list(OEM_OWNER, &fresh)).unwrap();

    let layers: Vec<Box<dyn VariableSource>> = vec![
        Box::new(FileSource::new().with_file("PK", &dump)),
        Box::new(efivars),
    ];
    let source = LayeredSource::new(layers);

    let auditor = Auditor::with_decoder(decoder, PolicyThresholds::default()).unwrap();
    let report = auditor.audit(DatabaseKind::Pk, &source, now()).unwrap();
    assert_eq!(report.findings[0].subject(), Some("New PK"));
}

#[test]
fn test_missing_variable_is_an_error() {
    let auditor = Auditor::with_decoder(TableDecoder::new(), PolicyThresholds::default()).unwrap();
    let err = auditor
        .audit(DatabaseKind::Pk, &MemorySource::new(), now())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "UEFI variable PK-8be4df61-93ca-11d2-aa0d-00e098032b8c not found"
    );
}
