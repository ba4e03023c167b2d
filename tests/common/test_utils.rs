//! Shared builders for signature database bytes and certificates.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use sbaudit::core::DecodedCertificate;
use sbaudit::formats::esl::{EFI_CERT_SHA256_GUID, EFI_CERT_X509_GUID, LIST_HEADER_SIZE, OWNER_SIZE};
use sbaudit::x509::{CertificateDecoder, DecodeError};
use uuid::Uuid;

pub const MICROSOFT_OWNER: Uuid = Uuid::from_u128(0x77fa9abd_0359_4d32_bd60_28f4e78f784b);
pub const OEM_OWNER: Uuid = Uuid::from_u128(0x26dc4851_195f_4ae1_9a19_fbf883bbb35e);

/// Fixed evaluation time used across the suite.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
}

/// Encodes one signature list; every entry must fill `entry_size` exactly.
pub fn signature_list(
    type_guid: Uuid,
    header: &[u8],
    entry_size: u32,
    entries: &[(Uuid, &[u8])],
) -> Vec<u8> {
    let list_size = LIST_HEADER_SIZE + header.len() + entries.len() * entry_size as usize;
    let mut out = Vec::with_capacity(list_size);
    out.extend_from_slice(&type_guid.to_bytes_le());
    out.extend_from_slice(&(list_size as u32).to_le_bytes());
    out.extend_from_slice(&(header.len() as u32).to_le_bytes());
    out.extend_from_slice(&entry_size.to_le_bytes());
    out.extend_from_slice(header);
    for (owner, payload) in entries {
        assert_eq!(OWNER_SIZE + payload.len(), entry_size as usize);
        out.extend_from_slice(&owner.to_bytes_le());
        out.extend_from_slice(payload);
    }
    out
}

/// One X.509 list holding a single certificate.
pub fn x509_list(owner: Uuid, der: &[u8]) -> Vec<u8> {
    signature_list(
        EFI_CERT_X509_GUID,
        &[],
        (OWNER_SIZE + der.len()) as u32,
        &[(owner, der)],
    )
}

/// One SHA-256 list holding every digest.
pub fn sha256_list(owner: Uuid, digests: &[[u8; 32]]) -> Vec<u8> {
    let entries: Vec<(Uuid, &[u8])> = digests.iter().map(|d| (owner, &d[..])).collect();
    signature_list(EFI_CERT_SHA256_GUID, &[], 48, &entries)
}

/// Decoder that looks certificates up by their exact payload bytes.
#[derive(Debug, Default)]
pub struct TableDecoder {
    certificates: HashMap<Vec<u8>, DecodedCertificate>,
}

impl TableDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `subject` under a synthetic payload and returns that payload.
    pub fn add(&mut self, subject: &str, not_valid_after: DateTime<Utc>) -> Vec<u8> {
        let payload = format!("cert:{}:{}", subject, not_valid_after.timestamp()).into_bytes();
        self.certificates.insert(
            payload.clone(),
            DecodedCertificate::new(subject, not_valid_after),
        );
        payload
    }
}

impl CertificateDecoder for TableDecoder {
    fn decode_der(&self, der: &[u8]) -> Result<DecodedCertificate, DecodeError> {
        self.certificates
            .get(der)
            .cloned()
            .ok_or_else(|| DecodeError::Malformed("unknown test payload".to_string()))
    }
}

/// Self-signed DER certificate expiring at midnight UTC on `not_after`'s day.
pub fn generate_certificate(common_name: &str, not_after: DateTime<Utc>) -> Vec<u8> {
    let mut params = rcgen::CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name = rcgen::DistinguishedName::new();
    params
        .distinguished_name
        .push(rcgen::DnType::CommonName, common_name);
    params.not_before = rcgen::date_time_ymd(2011, 1, 1);
    params.not_after = rcgen::date_time_ymd(
        not_after.year(),
        not_after.month() as u8,
        not_after.day() as u8,
    );
    let key = rcgen::KeyPair::generate().unwrap();
    params.self_signed(&key).unwrap().der().to_vec()
}
