//! Linux efivarfs variable access.

use std::fs;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use super::{VariableError, VariableSource};

/// Default efivarfs mount point
pub const DEFAULT_EFIVARFS_ROOT: &str = "/sys/firmware/efi/efivars";

/// efivarfs files start with the 32-bit variable attributes
const ATTRIBUTES_SIZE: usize = 4;

/// Reads variables from an efivarfs mount (`{root}/{name}-{guid}`).
#[derive(Debug, Clone)]
pub struct EfivarfsSource {
    root: PathBuf,
}

impl Default for EfivarfsSource {
    fn default() -> Self {
        Self::new(DEFAULT_EFIVARFS_ROOT)
    }
}

impl EfivarfsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn variable_path(&self, name: &str, namespace: Uuid) -> PathBuf {
        self.root
            .join(format!("{}-{}", name, namespace.hyphenated()))
    }
}

impl VariableSource for EfivarfsSource {
    fn get_variable(&self, name: &str, namespace: Uuid) -> Result<Vec<u8>, VariableError> {
        let path = self.variable_path(name, namespace);
        let mut data = fs::read(&path).map_err(|e| VariableError::from_io(name, namespace, e))?;

        if data.len() < ATTRIBUTES_SIZE {
            return Err(VariableError::Truncated {
                name: name.to_string(),
                len: data.len(),
            });
        }

        let attributes = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        debug!(
            variable = name,
            path = %path.display(),
            attributes = %format!("{:#x}", attributes),
            size = data.len() - ATTRIBUTES_SIZE,
            "Read efivarfs variable"
        );

        data.drain(..ATTRIBUTES_SIZE);
        Ok(data)
    }
}
