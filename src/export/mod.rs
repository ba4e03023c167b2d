//! Persist certificates and hash lists extracted from a signature database.
//!
//! Artifacts are named after the variable and the list index: certificate
//! lists become `{VAR}{i}.der` (or `{VAR}{i}_{j}.der` when a list holds
//! several certificates) and hash lists become `{VAR}{i}.hsh` with every
//! digest concatenated in list order.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::core::DatabaseKind;
use crate::formats::esl::{SignatureList, SignatureType};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Certificate,
    HashList,
}

/// A file written by [`export_database`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub list_index: usize,
    pub size: usize,
}

/// Planned artifact: file name and contents, before anything touches disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedArtifact {
    pub file_name: String,
    pub kind: ArtifactKind,
    pub list_index: usize,
    pub contents: Vec<u8>,
}

/// Work out artifact names and contents for a parsed database.
pub fn plan_artifacts(kind: DatabaseKind, lists: &[SignatureList]) -> Vec<PlannedArtifact> {
    let prefix = kind.variable_name();
    let mut planned = Vec::new();

    for (i, list) in lists.iter().enumerate() {
        match list.signature_type {
            SignatureType::Sha256 => planned.push(PlannedArtifact {
                file_name: format!("{}{}.hsh", prefix, i),
                kind: ArtifactKind::HashList,
                list_index: i,
                contents: list.entries.iter().flat_map(|e| e.payload().iter().copied()).collect(),
            }),
            SignatureType::X509 | SignatureType::Unknown(_) => {
                let single = list.entries.len() == 1;
                for (j, entry) in list.entries.iter().enumerate() {
                    let file_name = if single {
                        format!("{}{}.der", prefix, i)
                    } else {
                        format!("{}{}_{}.der", prefix, i, j)
                    };
                    planned.push(PlannedArtifact {
                        file_name,
                        kind: ArtifactKind::Certificate,
                        list_index: i,
                        contents: entry.payload().to_vec(),
                    });
                }
            }
        }
    }

    planned
}

/// Write every certificate and hash list of `lists` into `dir`.
pub fn export_database(
    kind: DatabaseKind,
    lists: &[SignatureList],
    dir: &Path,
) -> Result<Vec<ExportedArtifact>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    plan_artifacts(kind, lists)
        .into_iter()
        .map(|artifact| {
            let path = dir.join(&artifact.file_name);
            fs::write(&path, &artifact.contents).map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
            info!(database = %kind, path = %path.display(), "Saved artifact");
            Ok(ExportedArtifact {
                path,
                kind: artifact.kind,
                list_index: artifact.list_index,
                size: artifact.contents.len(),
            })
        })
        .collect()
}
