/// File handling utilities
///
/// This module loads notebook files from disk, fingerprints them, and discovers
/// notebooks inside directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::Value;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// Notebook file extension
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Errors raised while locating or parsing a notebook file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{} not found", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A notebook read from disk
#[derive(Debug, Clone)]
pub struct LoadedNotebook {
    pub path: PathBuf,
    /// Parsed but not yet validated document
    pub document: Value,
    /// Hex SHA-256 of the raw file bytes
    pub fingerprint: String,
}

/// Fail with `NotFound` unless `path` is an existing file.
pub fn ensure_exists(path: &Path) -> Result<(), LoadError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(LoadError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Read and parse a notebook file.
///
/// # Arguments
///
/// * `path` - Path to the notebook
///
/// # Returns
///
/// The parsed document with its fingerprint
pub fn load_notebook(path: &Path) -> Result<LoadedNotebook, LoadError> {
    ensure_exists(path)?;

    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    let document = serde_json::from_slice(&bytes).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(LoadedNotebook {
        path: path.to_path_buf(),
        document,
        fingerprint: fingerprint(&bytes),
    })
}

/// Hex-encoded SHA-256 digest of `bytes`.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn is_notebook_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(NOTEBOOK_EXTENSION))
        .unwrap_or(false)
}

/// Recursively find notebooks under `dir`, skipping checkpoint copies.
///
/// Results are sorted so repeated runs check notebooks in the same order.
pub fn find_notebooks(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::NotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut notebooks = Vec::new();

    let walker = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".ipynb_checkpoints");

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_notebook_file(entry.path()) {
            notebooks.push(entry.into_path());
        }
    }

    notebooks.sort();
    Ok(notebooks)
}
