//! Persisting generated units.
//!
//! The destination directory carries a `hashes.json` manifest mapping each
//! file's relative path to its content hash. A later build compares fresh
//! hashes against it and only regenerates and rewrites what changed.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::output::{Payload, WriterData};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("cannot create directory `{path}`: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("cannot write `{path}`: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot remove `{path}`: {source}")]
    Remove { path: PathBuf, source: io::Error },
    #[error("cannot read manifest `{path}`: {source}")]
    ReadManifest { path: PathBuf, source: io::Error },
    #[error("malformed manifest `{path}`: {source}")]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("`{0}` was generated without contents")]
    MissingContents(String),
}

/// Relative path to content hash, as of the last successful build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashManifest {
    files: BTreeMap<String, u64>,
}

impl HashManifest {
    pub const FILE_NAME: &'static str = "hashes.json";

    pub fn from_units(units: &[WriterData]) -> Self {
        HashManifest {
            files: units.iter().map(|u| (u.path(), u.content_hash())).collect(),
        }
    }

    /// The manifest in `dest`, or an empty one for a first build.
    pub fn load(dest: &Path) -> Result<Self, WriteError> {
        let path = dest.join(Self::FILE_NAME);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(WriteError::ReadManifest { path, source }),
        };
        serde_json::from_str(&text).map_err(|source| WriteError::Manifest { path, source })
    }

    pub fn save(&self, dest: &Path) -> Result<(), WriteError> {
        let path = dest.join(Self::FILE_NAME);
        let text = serde_json::to_string_pretty(self).map_err(|source| WriteError::Manifest {
            path: path.clone(),
            source,
        })?;
        create_dir(dest)?;
        fs::write(&path, text).map_err(|source| WriteError::Write { path, source })
    }

    pub fn get(&self, path: &str) -> Option<u64> {
        self.files.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths of `units` that are new or whose hash differs.
    pub fn changed_paths(&self, units: &[WriterData]) -> Vec<String> {
        units
            .iter()
            .filter(|u| self.get(&u.path()) != Some(u.content_hash()))
            .map(WriterData::path)
            .collect()
    }

    /// Paths recorded here that `newer` no longer produces.
    pub fn stale_paths(&self, newer: &HashManifest) -> Vec<String> {
        self.files
            .keys()
            .filter(|path| !newer.files.contains_key(*path))
            .cloned()
            .collect()
    }
}

/// Write contents-mode units under `dest`. Returns the number of files
/// written.
pub fn write_units(dest: &Path, units: &[WriterData]) -> Result<usize, WriteError> {
    for unit in units {
        let Payload::Contents { text, comments } = &unit.payload else {
            return Err(WriteError::MissingContents(unit.path()));
        };
        let path = dest.join(unit.path());
        if let Some(parent) = path.parent() {
            create_dir(parent)?;
        }
        let mut out = String::with_capacity(text.len());
        for comment in comments {
            for line in comment.lines() {
                out.push_str("// ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str(text);
        fs::write(&path, out).map_err(|source| WriteError::Write { path, source })?;
    }
    tracing::debug!(dest = %dest.display(), files = units.len(), "units written");
    Ok(units.len())
}

/// Delete files under `dest`; already missing files are fine. Returns the
/// number of files removed.
pub fn remove_files(dest: &Path, paths: &[String]) -> Result<usize, WriteError> {
    let mut removed = 0;
    for relative in paths {
        let path = dest.join(relative);
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(WriteError::Remove { path, source }),
        }
    }
    Ok(removed)
}

fn create_dir(path: &Path) -> Result<(), WriteError> {
    fs::create_dir_all(path).map_err(|source| WriteError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
