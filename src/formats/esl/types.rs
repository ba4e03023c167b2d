//! Core EFI signature list data types and structures

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// EFI_SIGNATURE_LIST header layout
pub const GUID_SIZE: usize = 16;
pub const LIST_HEADER_SIZE: usize = GUID_SIZE + 3 * 4; // type + list size + header size + entry size
pub const OWNER_SIZE: usize = GUID_SIZE;
pub const SHA256_DIGEST_SIZE: usize = 32;

/// EFI_CERT_X509_GUID
pub const EFI_CERT_X509_GUID: Uuid = Uuid::from_u128(0xa5c059a1_94e4_4aa7_87b5_ab155c2bf072);
/// EFI_CERT_SHA256_GUID
pub const EFI_CERT_SHA256_GUID: Uuid = Uuid::from_u128(0xc1c41626_504c_4092_aca9_41f936934328);

/// Signature list parsing error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EslError {
    #[error("Unsupported signature type {guid} at offset {offset:#x}")]
    UnsupportedSignatureType { offset: usize, guid: Uuid },

    #[error("Malformed signature list at offset {offset:#x}: {reason}")]
    MalformedList { offset: usize, reason: String },

    #[error("Truncated buffer at offset {offset:#x}: expected {expected} bytes, got {actual}")]
    TruncatedBuffer {
        offset: usize,
        expected: usize,
        actual: usize,
    },
}

impl EslError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedList {
            offset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EslError>;

/// Signature types recognized in a signature list header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureType {
    X509,
    #[serde(rename = "SHA256")]
    Sha256,
    Unknown(Uuid),
}

impl SignatureType {
    /// Map a signature type GUID to its variant
    pub fn from_guid(guid: Uuid) -> Self {
        if guid == EFI_CERT_X509_GUID {
            Self::X509
        } else if guid == EFI_CERT_SHA256_GUID {
            Self::Sha256
        } else {
            Self::Unknown(guid)
        }
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X509 => write!(f, "X509"),
            Self::Sha256 => write!(f, "SHA256"),
            Self::Unknown(guid) => write!(f, "Unknown({})", guid),
        }
    }
}

/// Signature payload, discriminated by the owning list's type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureData {
    /// DER-encoded X.509 certificate
    X509(Vec<u8>),
    /// SHA-256 digest
    Sha256([u8; SHA256_DIGEST_SIZE]),
}

/// A single EFI_SIGNATURE_DATA entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub owner: Uuid,
    pub data: SignatureData,
}

impl SignatureEntry {
    /// Raw payload bytes (certificate DER or digest)
    pub fn payload(&self) -> &[u8] {
        match &self.data {
            SignatureData::X509(der) => der,
            SignatureData::Sha256(digest) => digest,
        }
    }

    pub fn signature_type(&self) -> SignatureType {
        match self.data {
            SignatureData::X509(_) => SignatureType::X509,
            SignatureData::Sha256(_) => SignatureType::Sha256,
        }
    }

    /// DER bytes if this entry holds a certificate
    pub fn certificate_der(&self) -> Option<&[u8]> {
        match &self.data {
            SignatureData::X509(der) => Some(der),
            SignatureData::Sha256(_) => None,
        }
    }
}

/// A single EFI_SIGNATURE_LIST
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureList {
    pub signature_type: SignatureType,
    pub header_size: u32,
    pub entry_size: u32,
    pub entries: Vec<SignatureEntry>,
}

impl SignatureList {
    /// Total serialized size of this list
    pub fn list_size(&self) -> usize {
        LIST_HEADER_SIZE + self.header_size as usize + self.entries.len() * self.entry_size as usize
    }
}
