//! Secure Boot signature database identities.
//!
//! Each database is stored as an authenticated UEFI variable; the kind
//! determines the variable name, its vendor namespace and which policy
//! rules apply when its certificates are evaluated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// EFI_GLOBAL_VARIABLE namespace (PK, KEK)
pub const EFI_GLOBAL_VARIABLE_GUID: Uuid = Uuid::from_u128(0x8be4df61_93ca_11d2_aa0d_00e098032b8c);

/// EFI_IMAGE_SECURITY_DATABASE_GUID namespace (db)
pub const EFI_IMAGE_SECURITY_DATABASE_GUID: Uuid =
    Uuid::from_u128(0xd719b2cb_3d3a_4596_a3bc_dad00e67656f);

/// Signature owner GUID used by Microsoft for its Secure Boot entries
pub const MICROSOFT_OWNER_GUID: Uuid = Uuid::from_u128(0x77fa9abd_0359_4d32_bd60_28f4e78f784b);

/// The Secure Boot databases that can be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DatabaseKind {
    /// Platform Key
    #[serde(rename = "PK")]
    Pk,
    /// Key Exchange Key database
    #[serde(rename = "KEK")]
    Kek,
    /// Allowed signature database
    #[serde(rename = "db")]
    Db,
}

impl DatabaseKind {
    pub const ALL: [DatabaseKind; 3] = [DatabaseKind::Pk, DatabaseKind::Kek, DatabaseKind::Db];

    /// UEFI variable name holding this database
    pub fn variable_name(&self) -> &'static str {
        match self {
            DatabaseKind::Pk => "PK",
            DatabaseKind::Kek => "KEK",
            DatabaseKind::Db => "db",
        }
    }

    /// Vendor namespace GUID of the variable
    pub fn namespace(&self) -> Uuid {
        match self {
            DatabaseKind::Pk | DatabaseKind::Kek => EFI_GLOBAL_VARIABLE_GUID,
            DatabaseKind::Db => EFI_IMAGE_SECURITY_DATABASE_GUID,
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variable_name())
    }
}

impl FromStr for DatabaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pk" => Ok(DatabaseKind::Pk),
            "kek" => Ok(DatabaseKind::Kek),
            "db" => Ok(DatabaseKind::Db),
            other => Err(format!("unknown signature database: {}", other)),
        }
    }
}

/// Human-readable label for a well-known signature owner
pub fn well_known_owner(owner: &Uuid) -> Option<&'static str> {
    if *owner == MICROSOFT_OWNER_GUID {
        Some("Microsoft")
    } else {
        None
    }
}
