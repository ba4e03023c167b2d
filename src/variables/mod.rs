//! Sources of raw UEFI variable data.
//!
//! The auditor only needs the bytes of `PK`, `KEK` and `db`; where they come
//! from is pluggable. Linux exposes them through efivarfs, offline dumps
//! come from files, and tests use an in-memory map.

mod efivarfs;

pub use efivarfs::{EfivarfsSource, DEFAULT_EFIVARFS_ROOT};

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum VariableError {
    #[error("UEFI variable {name}-{namespace} not found")]
    NotFound { name: String, namespace: Uuid },

    #[error("UEFI variable {name} is truncated ({len} bytes)")]
    Truncated { name: String, len: usize },

    #[error("Failed to read UEFI variable {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl VariableError {
    pub(crate) fn from_io(name: &str, namespace: Uuid, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            VariableError::NotFound {
                name: name.to_string(),
                namespace,
            }
        } else {
            VariableError::Io {
                name: name.to_string(),
                source: err,
            }
        }
    }
}

/// Supplies the raw contents of a UEFI variable.
pub trait VariableSource: Send + Sync {
    fn get_variable(&self, name: &str, namespace: Uuid) -> Result<Vec<u8>, VariableError>;
}

/// Raw signature database dumps on disk, keyed by variable name.
///
/// Files hold the bare variable payload without an attribute prefix, as
/// written by `efi-readvar -o` or a previous export.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    paths: HashMap<String, PathBuf>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(name.into(), path.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.paths.insert(name.into(), path.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }
}

impl VariableSource for FileSource {
    fn get_variable(&self, name: &str, namespace: Uuid) -> Result<Vec<u8>, VariableError> {
        let path = self.paths.get(name).ok_or_else(|| VariableError::NotFound {
            name: name.to_string(),
            namespace,
        })?;
        debug!(variable = name, path = %path.display(), "Reading variable dump");
        // An explicitly configured dump must exist; never fall through.
        fs::read(path).map_err(|source| VariableError::Io {
            name: name.to_string(),
            source,
        })
    }
}

/// In-memory variables keyed by `(name, namespace)`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    variables: HashMap<(String, Uuid), Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>, namespace: Uuid, data: Vec<u8>) -> Self {
        self.variables.insert((name.into(), namespace), data);
        self
    }
}

impl VariableSource for MemorySource {
    fn get_variable(&self, name: &str, namespace: Uuid) -> Result<Vec<u8>, VariableError> {
        self.variables
            .get(&(name.to_string(), namespace))
            .cloned()
            .ok_or_else(|| VariableError::NotFound {
                name: name.to_string(),
                namespace,
            })
    }
}

/// Prefer the first source that has the variable, falling back to the next.
pub struct LayeredSource {
    layers: Vec<Box<dyn VariableSource>>,
}

impl LayeredSource {
    pub fn new(layers: Vec<Box<dyn VariableSource>>) -> Self {
        Self { layers }
    }
}

impl VariableSource for LayeredSource {
    fn get_variable(&self, name: &str, namespace: Uuid) -> Result<Vec<u8>, VariableError> {
        for layer in &self.layers {
            match layer.get_variable(name, namespace) {
                Err(VariableError::NotFound { .. }) => continue,
                other => return other,
            }
        }
        Err(VariableError::NotFound {
            name: name.to_string(),
            namespace,
        })
    }
}
