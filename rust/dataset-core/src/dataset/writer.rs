// rust/dataset-core/src/dataset/writer.rs

//! Dataset writer producing the folder layout the reader consumes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{DatasetError, Result};
use crate::storage::{LocalStorage, StorageBackend};

use super::manifest::{TensorManifest, MANIFEST_FILE};

/// Writes a manifest and then appends batches, one file per tensor each.
///
/// Batches are numbered from 0 in the order they are written, so a folder
/// produced by this writer always has contiguous batch files. Batch files
/// left over from an earlier dataset in the same folder are removed when
/// the writer is created.
pub struct DatasetWriter {
    storage: Arc<dyn StorageBackend>,
    folder: PathBuf,
    manifest: TensorManifest,
    batches_written: usize,
}

impl DatasetWriter {
    /// Creates a dataset folder on the local filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder, the tensor directories or the
    /// manifest cannot be created.
    pub fn create(folder: impl Into<PathBuf>, manifest: TensorManifest) -> Result<Self> {
        Self::with_storage(Arc::new(LocalStorage::new()), folder, manifest)
    }

    /// Creates a dataset folder through an explicit storage backend.
    ///
    /// An existing manifest is overwritten and existing `batch_<n>.bin`
    /// files under the tensor directories are deleted. Other files are left
    /// alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder, the tensor directories or the
    /// manifest cannot be created, if stale batch files cannot be removed,
    /// or if two tensors share a name.
    pub fn with_storage(
        storage: Arc<dyn StorageBackend>,
        folder: impl Into<PathBuf>,
        manifest: TensorManifest,
    ) -> Result<Self> {
        let folder = folder.into();

        for (i, spec) in manifest.iter().enumerate() {
            if manifest.position(&spec.name) != Some(i) {
                return Err(DatasetError::manifest(
                    folder.join(MANIFEST_FILE),
                    i + 1,
                    format!("duplicate tensor name '{}'", spec.name),
                ));
            }
            if spec.name.contains(' ') {
                return Err(DatasetError::manifest(
                    folder.join(MANIFEST_FILE),
                    i + 1,
                    format!("tensor name '{}' contains a space", spec.name),
                ));
            }
        }

        storage.create_dir_all(&folder)?;
        for spec in &manifest {
            let dir = folder.join(&spec.name);
            storage.create_dir_all(&dir)?;
            for name in storage.list(&dir)? {
                if is_batch_file_name(&name) {
                    storage.delete(&dir.join(&name))?;
                }
            }
        }
        storage.write(
            &folder.join(MANIFEST_FILE),
            manifest.to_manifest_string().as_bytes(),
        )?;

        debug!(folder = %folder.display(), tensors = manifest.len(), "created dataset");

        Ok(Self {
            storage,
            folder,
            manifest,
            batches_written: 0,
        })
    }

    /// Writes the next batch. `data` holds one slice per tensor in
    /// manifest order, each exactly the tensor's byte size.
    ///
    /// Returns the index of the written batch.
    ///
    /// # Errors
    ///
    /// Returns `TensorCount` or `BatchSize` if `data` does not match the
    /// manifest (nothing is written in that case), or a storage error.
    pub fn write_batch(&mut self, data: &[&[u8]]) -> Result<usize> {
        if data.len() != self.manifest.len() {
            return Err(DatasetError::tensor_count(self.manifest.len(), data.len()));
        }
        for (spec, bytes) in self.manifest.iter().zip(data) {
            if bytes.len() != spec.byte_size {
                return Err(DatasetError::batch_size(&spec.name, spec.byte_size, bytes.len()));
            }
        }

        let index = self.batches_written;
        for (spec, bytes) in self.manifest.iter().zip(data) {
            self.storage.write(&spec.batch_path(&self.folder, index), bytes)?;
        }
        self.batches_written += 1;
        Ok(index)
    }

    pub fn batches_written(&self) -> usize {
        self.batches_written
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn manifest(&self) -> &TensorManifest {
        &self.manifest
    }
}

fn is_batch_file_name(name: &str) -> bool {
    name.strip_prefix("batch_")
        .and_then(|rest| rest.strip_suffix(".bin"))
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}
