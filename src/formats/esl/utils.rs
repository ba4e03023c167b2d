//! Utility functions for signature list parsing

use uuid::Uuid;

use crate::formats::esl::types::GUID_SIZE;

/// Extension trait for reading primitive types from byte slices
pub trait ReadExt {
    fn read_u32_le_at(&self, offset: usize) -> Option<u32>;
    fn read_guid_at(&self, offset: usize) -> Option<Uuid>;
    fn read_slice_at(&self, offset: usize, len: usize) -> Option<&[u8]>;
}

impl ReadExt for [u8] {
    #[inline(always)]
    fn read_u32_le_at(&self, offset: usize) -> Option<u32> {
        self.get(offset..offset.checked_add(4)?)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
    }

    /// EFI GUIDs are stored with the first three fields little-endian
    #[inline(always)]
    fn read_guid_at(&self, offset: usize) -> Option<Uuid> {
        self.get(offset..offset.checked_add(GUID_SIZE)?)
            .and_then(|b| b.try_into().ok())
            .map(Uuid::from_bytes_le)
    }

    #[inline(always)]
    fn read_slice_at(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.get(offset..offset.checked_add(len)?)
    }
}
