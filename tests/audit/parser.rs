//! Structural behaviour of the signature database parser.

use sbaudit::formats::esl::{
    parse, EslError, SignatureData, SignatureDatabase, SignatureType, EFI_CERT_SHA256_GUID,
    EFI_CERT_X509_GUID, LIST_HEADER_SIZE,
};
use uuid::Uuid;

use crate::common::{sha256_list, signature_list, x509_list, MICROSOFT_OWNER, OEM_OWNER};

#[test]
fn test_lists_and_entries_preserve_input_order() {
    let cert_a = vec![0x30u8; 40];
    let cert_b = vec![0x31u8; 40];
    let mut data = signature_list(
        EFI_CERT_X509_GUID,
        &[],
        56,
        &[(MICROSOFT_OWNER, &cert_a[..]), (OEM_OWNER, &cert_b[..])],
    );
    data.extend(sha256_list(OEM_OWNER, &[[1; 32], [2; 32]]));
    data.extend(x509_list(MICROSOFT_OWNER, &[0x30, 0x03, 0x01, 0x01, 0xff]));

    let lists = parse(&data).unwrap();
    let types: Vec<SignatureType> = lists.iter().map(|l| l.signature_type).collect();
    assert_eq!(
        types,
        vec![SignatureType::X509, SignatureType::Sha256, SignatureType::X509]
    );
    assert_eq!(lists[0].entries[0].payload(), &cert_a[..]);
    assert_eq!(lists[0].entries[1].payload(), &cert_b[..]);
    assert_eq!(lists[0].entries[1].owner, OEM_OWNER);
    assert_eq!(lists[1].entries[1].data, SignatureData::Sha256([2; 32]));

    // Sizes reported by the lists account for every input byte.
    let total: usize = lists.iter().map(|l| l.list_size()).sum();
    assert_eq!(total, data.len());
}

#[test]
fn test_database_flattened_view() {
    let mut data = x509_list(MICROSOFT_OWNER, &[0x30; 20]);
    data.extend(sha256_list(OEM_OWNER, &[[7; 32]; 3]));

    let db = SignatureDatabase::parse(&data).unwrap();
    assert_eq!(db.entry_count(), 4);
    assert_eq!(db.certificates().count(), 1);
    assert_eq!(db.hashes().count(), 3);
    let list_indices: Vec<usize> = db.entries().map(|(i, _)| i).collect();
    assert_eq!(list_indices, vec![0, 1, 1, 1]);
    assert_eq!(db.first_entry().map(|e| e.owner), Some(MICROSOFT_OWNER));
}

#[test]
fn test_unsupported_type_aborts_whole_parse() {
    let mut data = x509_list(MICROSOFT_OWNER, &[0x30; 20]);
    let offset = data.len();
    let rsa2048 = Uuid::from_u128(0x3c5766e8_269c_4e34_aa14_ed776e85b3b6);
    data.extend(signature_list(rsa2048, &[], 16 + 256, &[(OEM_OWNER, &[0u8; 256][..])]));
    data.extend(x509_list(MICROSOFT_OWNER, &[0x30; 20]));

    match parse(&data) {
        Err(EslError::UnsupportedSignatureType { offset: at, guid }) => {
            assert_eq!(at, offset);
            assert_eq!(guid, rsa2048);
        }
        other => panic!("expected unsupported signature type, got {:?}", other),
    }
}

#[test]
fn test_signature_size_of_ten_is_malformed() {
    let mut data = signature_list(EFI_CERT_X509_GUID, &[], 10, &[]);
    let list_size = (LIST_HEADER_SIZE + 20) as u32;
    data[16..20].copy_from_slice(&list_size.to_le_bytes());
    data.extend_from_slice(&[0u8; 20]);

    assert!(matches!(parse(&data), Err(EslError::MalformedList { offset: 0, .. })));
}

#[test]
fn test_entry_region_must_divide_evenly() {
    let mut data = sha256_list(OEM_OWNER, &[[3; 32]]);
    let bumped = (data.len() + 5) as u32;
    data[16..20].copy_from_slice(&bumped.to_le_bytes());
    data.extend_from_slice(&[0u8; 5]);

    assert!(matches!(parse(&data), Err(EslError::MalformedList { .. })));
}

#[test]
fn test_sha256_entry_size_must_match_digest() {
    let payload = [9u8; 40];
    let data = signature_list(EFI_CERT_SHA256_GUID, &[], 56, &[(OEM_OWNER, &payload[..])]);
    assert!(matches!(parse(&data), Err(EslError::MalformedList { .. })));
}

#[test]
fn test_truncated_header_and_body() {
    let data = x509_list(MICROSOFT_OWNER, &[0x30; 20]);

    match parse(&data[..LIST_HEADER_SIZE - 1]) {
        Err(EslError::TruncatedBuffer { offset, .. }) => assert_eq!(offset, 0),
        other => panic!("expected truncated header, got {:?}", other),
    }
    assert!(matches!(
        parse(&data[..data.len() - 1]),
        Err(EslError::TruncatedBuffer { .. })
    ));
}

#[test]
fn test_trailing_garbage_after_valid_list_is_an_error() {
    let mut data = sha256_list(OEM_OWNER, &[[4; 32]]);
    data.extend_from_slice(&[0xde, 0xad]);
    assert!(parse(&data).is_err());
}
