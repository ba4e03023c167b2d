//! Exporting certificates and hash lists from audited databases.

use std::fs;

use chrono::Duration;
use sbaudit::core::DatabaseKind;
use sbaudit::export::ArtifactKind;
use sbaudit::formats::esl::EFI_CERT_X509_GUID;
use sbaudit::{export_report, Auditor, PolicyThresholds};

use crate::common::{now, sha256_list, signature_list, x509_list, TableDecoder, OEM_OWNER};

#[test]
fn test_export_report_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let mut decoder = TableDecoder::new();
    let one = decoder.add("Signer One", now() + Duration::days(800));
    let two = decoder.add("Signer Two", now() + Duration::days(800));
    let three = decoder.add("Signer Three", now() + Duration::days(800));
    assert_eq!(one.len(), two.len());

    let mut data = x509_list(OEM_OWNER, &three);
    data.extend(signature_list(
        EFI_CERT_X509_GUID,
        &[],
        (16 + one.len()) as u32,
        &[(OEM_OWNER, &one[..]), (OEM_OWNER, &two[..])],
    ));
    data.extend(sha256_list(OEM_OWNER, &[[1; 32], [2; 32]]));

    let auditor = Auditor::with_decoder(decoder, PolicyThresholds::default()).unwrap();
    let mut report = auditor.inspect(DatabaseKind::Db, &data, now()).unwrap();
    let out = dir.path().join("export");
    export_report(&mut report, &out).unwrap();

    let names: Vec<String> = report
        .artifacts
        .iter()
        .map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["db0.der", "db1_0.der", "db1_1.der", "db2.hsh"]);
    assert_eq!(report.artifacts[3].kind, ArtifactKind::HashList);
    assert_eq!(fs::read(out.join("db0.der")).unwrap(), three);
    assert_eq!(fs::read(out.join("db2.hsh")).unwrap().len(), 64);

    let text = report.to_string();
    assert!(text.contains("Saved "));
    assert!(text.contains("db2.hsh"));
}

#[test]
fn test_export_into_file_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"x").unwrap();

    let auditor = Auditor::with_decoder(TableDecoder::new(), PolicyThresholds::default()).unwrap();
    let mut report = auditor
        .inspect(DatabaseKind::Db, &sha256_list(OEM_OWNER, &[[5; 32]]), now())
        .unwrap();
    assert!(export_report(&mut report, &blocker).is_err());
    assert!(report.artifacts.is_empty());
}
