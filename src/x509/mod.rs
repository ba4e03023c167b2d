//! X.509 certificate decoding for signature database payloads.

use chrono::{DateTime, Utc};
use thiserror::Error;
use x509_parser::der_parser::asn1_rs::Tag;
use x509_parser::prelude::*;

use crate::core::DecodedCertificate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Malformed certificate: {0}")]
    Malformed(String),

    #[error("Certificate subject has no common name")]
    MissingCommonName,

    #[error("Certificate validity out of range: {0}")]
    InvalidValidity(i64),
}

/// Extracts policy-relevant fields from a DER certificate.
pub trait CertificateDecoder: Send + Sync {
    fn decode_der(&self, der: &[u8]) -> Result<DecodedCertificate, DecodeError>;
}

/// Decoder backed by `x509-parser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct X509Decoder;

impl CertificateDecoder for X509Decoder {
    fn decode_der(&self, der: &[u8]) -> Result<DecodedCertificate, DecodeError> {
        // Trailing bytes after the certificate are tolerated; some
        // firmware pads entries.
        let (_, cert) =
            X509Certificate::from_der(der).map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let subject_common_name = cert
            .subject()
            .iter_common_name()
            .next()
            .ok_or(DecodeError::MissingCommonName)
            .and_then(attribute_string)?;

        let timestamp = cert.validity().not_after.timestamp();
        let not_valid_after: DateTime<Utc> =
            DateTime::from_timestamp(timestamp, 0).ok_or(DecodeError::InvalidValidity(timestamp))?;

        Ok(DecodedCertificate {
            subject_common_name,
            not_valid_after,
        })
    }
}

/// String value of a name attribute, including BMPString (UTF-16BE) values.
fn attribute_string(attr: &AttributeTypeAndValue<'_>) -> Result<String, DecodeError> {
    if let Ok(s) = attr.as_str() {
        return Ok(s.to_string());
    }
    let value = attr.attr_value();
    if value.tag() != Tag::BmpString {
        return Err(DecodeError::Malformed(format!(
            "unsupported common name string type {:?}",
            value.tag()
        )));
    }
    let bytes = value.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::Malformed(
            "odd-length BMPString common name".to_string(),
        ));
    }
    char::decode_utf16(
        bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]])),
    )
    .collect::<Result<String, _>>()
    .map_err(|e| DecodeError::Malformed(e.to_string()))
}
