//! EFI signature database (EFI_SIGNATURE_LIST) parser
//!
//! A signature database is a concatenation of signature lists with no
//! trailing length field; the end of the buffer terminates the database.
//! Every list carries a type GUID, three little-endian size fields, an
//! optional list header and a run of fixed-size entries.

pub mod types;
pub mod utils;

pub use types::*;
use tracing::{debug, trace};
use utils::ReadExt;

/// Parse a raw signature database into its lists, in input order.
///
/// Any structural problem aborts the whole parse; no partial result is
/// returned.
pub fn parse(data: &[u8]) -> Result<Vec<SignatureList>> {
    let mut lists = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let (list, consumed) = parse_list(data, offset)?;
        debug!(
            offset,
            signature_type = %list.signature_type,
            entries = list.entries.len(),
            "Parsed signature list"
        );
        lists.push(list);
        offset += consumed;
    }

    Ok(lists)
}

/// Parse one list starting at `offset`, returning it with its declared size.
fn parse_list(data: &[u8], offset: usize) -> Result<(SignatureList, usize)> {
    let remaining = data.len() - offset;
    let truncated = |expected: usize| EslError::TruncatedBuffer {
        offset,
        expected,
        actual: remaining,
    };

    if remaining < LIST_HEADER_SIZE {
        return Err(truncated(LIST_HEADER_SIZE));
    }

    let guid = data
        .read_guid_at(offset)
        .ok_or_else(|| truncated(LIST_HEADER_SIZE))?;

    let signature_type = SignatureType::from_guid(guid);
    let make_data: fn(&[u8]) -> Option<SignatureData> = match signature_type {
        SignatureType::X509 => |payload| Some(SignatureData::X509(payload.to_vec())),
        SignatureType::Sha256 => |payload| payload.try_into().ok().map(SignatureData::Sha256),
        SignatureType::Unknown(guid) => {
            return Err(EslError::UnsupportedSignatureType { offset, guid });
        }
    };

    let read_size = |at: usize| {
        data.read_u32_le_at(offset + at)
            .ok_or_else(|| truncated(LIST_HEADER_SIZE))
    };
    let list_size_raw = read_size(GUID_SIZE)?;
    let header_size_raw = read_size(GUID_SIZE + 4)?;
    let entry_size_raw = read_size(GUID_SIZE + 8)?;

    let list_size = list_size_raw as usize;
    let header_size = header_size_raw as usize;
    let entry_size = entry_size_raw as usize;

    if entry_size <= OWNER_SIZE {
        return Err(EslError::malformed(
            offset,
            format!(
                "signature size {} does not exceed owner size {}",
                entry_size, OWNER_SIZE
            ),
        ));
    }

    let minimum = LIST_HEADER_SIZE
        .checked_add(header_size)
        .and_then(|n| n.checked_add(entry_size))
        .ok_or_else(|| EslError::malformed(offset, "size fields overflow"))?;
    if list_size < minimum {
        return Err(EslError::malformed(
            offset,
            format!("list size {} is below minimum {}", list_size, minimum),
        ));
    }

    let entries_len = list_size - LIST_HEADER_SIZE - header_size;
    if entries_len % entry_size != 0 {
        return Err(EslError::malformed(
            offset,
            format!(
                "entry region of {} bytes is not a multiple of signature size {}",
                entries_len, entry_size
            ),
        ));
    }

    if signature_type == SignatureType::Sha256 && entry_size != OWNER_SIZE + SHA256_DIGEST_SIZE {
        return Err(EslError::malformed(
            offset,
            format!(
                "SHA256 signature size must be {}, got {}",
                OWNER_SIZE + SHA256_DIGEST_SIZE,
                entry_size
            ),
        ));
    }

    if list_size > remaining {
        return Err(truncated(list_size));
    }

    let mut cursor = offset + LIST_HEADER_SIZE + header_size;
    let end = offset + list_size;
    let mut entries = Vec::with_capacity(entries_len / entry_size);

    while cursor < end {
        let owner = data
            .read_guid_at(cursor)
            .ok_or_else(|| truncated(list_size))?;
        let payload = data
            .read_slice_at(cursor + OWNER_SIZE, entry_size - OWNER_SIZE)
            .ok_or_else(|| truncated(list_size))?;
        let entry_data = make_data(payload).ok_or_else(|| {
            EslError::malformed(cursor, "payload length inconsistent with signature type")
        })?;

        trace!(offset = cursor, %owner, "Parsed signature entry");
        entries.push(SignatureEntry {
            owner,
            data: entry_data,
        });
        cursor += entry_size;
    }

    let list = SignatureList {
        signature_type,
        header_size: header_size_raw,
        entry_size: entry_size_raw,
        entries,
    };

    Ok((list, list_size))
}

/// Parsed signature database with convenience accessors
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureDatabase {
    lists: Vec<SignatureList>,
}

impl SignatureDatabase {
    /// Parse a raw signature database
    pub fn parse(data: &[u8]) -> Result<Self> {
        parse(data).map(|lists| Self { lists })
    }

    /// Get all lists
    pub fn lists(&self) -> &[SignatureList] {
        &self.lists
    }

    /// Iterate every entry as `(list_index, entry)`, list-major
    pub fn entries(&self) -> impl Iterator<Item = (usize, &SignatureEntry)> {
        self.lists
            .iter()
            .enumerate()
            .flat_map(|(i, list)| list.entries.iter().map(move |e| (i, e)))
    }

    /// Iterate certificate entries
    pub fn certificates(&self) -> impl Iterator<Item = &SignatureEntry> {
        self.entries()
            .map(|(_, e)| e)
            .filter(|e| e.signature_type() == SignatureType::X509)
    }

    /// Iterate hash entries
    pub fn hashes(&self) -> impl Iterator<Item = &SignatureEntry> {
        self.entries()
            .map(|(_, e)| e)
            .filter(|e| e.signature_type() == SignatureType::Sha256)
    }

    /// First entry of the database; for PK this is the platform key itself
    pub fn first_entry(&self) -> Option<&SignatureEntry> {
        self.lists.first().and_then(|l| l.entries.first())
    }

    /// Total number of entries across all lists
    pub fn entry_count(&self) -> usize {
        self.lists.iter().map(|l| l.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
