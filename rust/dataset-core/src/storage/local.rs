// rust/dataset-core/src/storage/local.rs

//! Local filesystem storage backend implementation.
//!
//! Every call opens its file, performs one bounded operation and lets the
//! handle drop before returning, so no descriptor outlives a call on any
//! exit path.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::traits::StorageBackend;
use crate::error::{DatasetError, Result};

/// Returns whether `path` can be opened for reading.
///
/// The handle is closed immediately; no other side effect.
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    File::open(path.as_ref()).is_ok()
}

/// Fills `buffer` with the first `buffer.len()` bytes of the file at `path`.
///
/// Returns `false` if the file cannot be opened or holds fewer bytes than
/// the buffer; in the short-read case the buffer may be partially written.
pub fn read_to_buffer(path: impl AsRef<Path>, buffer: &mut [u8]) -> bool {
    read_exact_from(path.as_ref(), buffer).is_ok()
}

fn read_exact_from(path: &Path, buffer: &mut [u8]) -> Result<()> {
    let mut file = File::open(path)
        .map_err(|e| DatasetError::storage_with_source(path, "failed to open file", e))?;
    file.read_exact(buffer).map_err(|e| {
        DatasetError::storage_with_source(
            path,
            format!("failed to read {} bytes", buffer.len()),
            e,
        )
    })
}

/// Local filesystem storage backend.
///
/// Relative paths resolve against an optional base path; absolute paths
/// are used as given.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    base_path: Option<PathBuf>,
}

impl LocalStorage {
    /// Creates a backend that uses paths exactly as given.
    pub fn new() -> Self {
        Self { base_path: None }
    }

    /// Creates a backend that resolves relative paths against `base_path`.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    /// Resolves a path relative to the base path.
    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_path {
            Some(base) if !path.is_absolute() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl StorageBackend for LocalStorage {
    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(file_exists(self.resolve_path(path)))
    }

    fn read_into(&self, path: &Path, buffer: &mut [u8]) -> Result<()> {
        read_exact_from(&self.resolve_path(path), buffer)
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        let full_path = self.resolve_path(path);
        fs::read(&full_path)
            .map_err(|e| DatasetError::storage_with_source(&full_path, "failed to read file", e))
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let full_path = self.resolve_path(path);

        // Create parent directories if needed
        if let Some(parent) = full_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    DatasetError::storage_with_source(
                        parent,
                        "failed to create parent directories",
                        e,
                    )
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&full_path)
            .map_err(|e| {
                DatasetError::storage_with_source(&full_path, "failed to create file", e)
            })?;

        file.write_all(data).map_err(|e| {
            DatasetError::storage_with_source(&full_path, "failed to write file", e)
        })?;
        file.flush().map_err(|e| {
            DatasetError::storage_with_source(&full_path, "failed to flush file", e)
        })
    }

    fn delete(&self, path: &Path) -> Result<()> {
        let full_path = self.resolve_path(path);
        fs::remove_file(&full_path)
            .map_err(|e| DatasetError::storage_with_source(&full_path, "failed to delete file", e))
    }

    fn list(&self, dir: &Path) -> Result<Vec<String>> {
        let full_path = self.resolve_path(dir);

        if !full_path.exists() {
            return Ok(Vec::new());
        }
        if !full_path.is_dir() {
            return Err(DatasetError::storage(&full_path, "path is not a directory"));
        }

        let entries = fs::read_dir(&full_path).map_err(|e| {
            DatasetError::storage_with_source(&full_path, "failed to read directory", e)
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                DatasetError::storage_with_source(&full_path, "failed to read directory entry", e)
            })?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let full_path = self.resolve_path(path);
        fs::create_dir_all(&full_path).map_err(|e| {
            DatasetError::storage_with_source(&full_path, "failed to create directories", e)
        })
    }
}
