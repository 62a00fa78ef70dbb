// rust/dataset-core/src/dataset/reader.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{DatasetError, Result};
use crate::storage::{LocalStorage, StorageBackend};

use super::buffers::BatchBuffers;
use super::manifest::{TensorManifest, TensorSpec};

/// One batch read into owned buffers.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Index of the batch files this was read from.
    pub index: usize,
    /// Tensor data in manifest order.
    pub buffers: BatchBuffers,
}

/// Sequential reader over a folder of per-tensor batch files.
///
/// Construction reads `<folder>/tensor_info` and counts how many batches
/// are present for every tensor, contiguously from `batch_0.bin`. After
/// that the reader only moves forward, one batch per successful
/// [`read_next`](Self::read_next), until [`reset`](Self::reset) rewinds it.
///
/// No file handle is held between calls.
///
/// As an [`Iterator`] the reader yields at most one `Err` per pass and then
/// ends; [`reset`](Self::reset) starts a new pass. The explicit read methods
/// never stop early and may retry a failed batch.
pub struct DatasetReader {
    storage: Arc<dyn StorageBackend>,
    folder: PathBuf,
    tensor_info: TensorManifest,
    max_size: usize,
    cur_cnt: usize,
    iter_failed: bool,
}

impl DatasetReader {
    /// Opens a dataset folder on the local filesystem.
    ///
    /// `max_size` caps the number of batches served; `None` serves every
    /// complete batch found on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing, unreadable or malformed.
    pub fn open(folder: impl Into<PathBuf>, max_size: Option<usize>) -> Result<Self> {
        Self::with_storage(Arc::new(LocalStorage::new()), folder, max_size)
    }

    /// Opens a dataset folder through an explicit storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing, unreadable or malformed.
    pub fn with_storage(
        storage: Arc<dyn StorageBackend>,
        folder: impl Into<PathBuf>,
        max_size: Option<usize>,
    ) -> Result<Self> {
        let folder = folder.into();
        let tensor_info = TensorManifest::load(storage.as_ref(), &folder)?;

        let file_cnt = count_complete_batches(storage.as_ref(), &folder, &tensor_info, max_size);
        let max_size = max_size.map_or(file_cnt, |cap| cap.min(file_cnt));

        debug!(
            folder = %folder.display(),
            tensors = tensor_info.len(),
            batches = max_size,
            "opened dataset"
        );

        Ok(Self {
            storage,
            folder,
            tensor_info,
            max_size,
            cur_cnt: 0,
            iter_failed: false,
        })
    }

    /// Rewinds to the first batch. No I/O.
    pub fn reset(&mut self) {
        self.cur_cnt = 0;
        self.iter_failed = false;
    }

    /// Reads the current batch into `buffers` and advances by one.
    ///
    /// `buffers` line up with the manifest order. Only the first
    /// `num_datas` tensors are read (`None` reads all; larger values clamp
    /// to the tensor count). Each tensor fills the first `byte_size` bytes
    /// of its buffer.
    ///
    /// Returns `false` when the dataset is exhausted or any read fails. On
    /// failure the cursor stays put and buffers filled before the failing
    /// tensor keep their new contents.
    pub fn read_next(&mut self, buffers: &mut [&mut [u8]], num_datas: Option<usize>) -> bool {
        match self.try_read_next(buffers, num_datas) {
            Ok(filled) => filled,
            Err(e) => {
                debug!(batch = self.cur_cnt, error = %e, "batch read failed");
                false
            }
        }
    }

    /// Like [`read_next`](Self::read_next), but reports why a read failed.
    ///
    /// `Ok(false)` means the dataset is exhausted and nothing was touched.
    /// Buffer count and sizes are checked before any file is opened, so a
    /// `MissingBuffer` or `BufferTooSmall` error leaves every buffer as it
    /// was.
    ///
    /// # Errors
    ///
    /// Returns `MissingBuffer` or `BufferTooSmall` for undersized
    /// destinations, or a storage error if a batch file cannot be read.
    pub fn try_read_next(
        &mut self,
        buffers: &mut [&mut [u8]],
        num_datas: Option<usize>,
    ) -> Result<bool> {
        if self.cur_cnt >= self.max_size {
            return Ok(false);
        }

        let count = self.read_count(num_datas);
        let tensors = &self.tensor_info.tensors()[..count];
        check_buffers(tensors, buffers)?;

        for (spec, buffer) in tensors.iter().zip(buffers.iter_mut()) {
            let path = spec.batch_path(&self.folder, self.cur_cnt);
            trace!(path = %path.display(), bytes = spec.byte_size, "reading batch file");
            self.storage.read_into(&path, &mut buffer[..spec.byte_size])?;
        }

        self.cur_cnt += 1;
        Ok(true)
    }

    /// Reads the current batch into owned buffers sized for this dataset.
    pub fn read_next_owned(&mut self, buffers: &mut BatchBuffers, num_datas: Option<usize>) -> bool {
        self.read_next(&mut buffers.as_mut_slices(), num_datas)
    }

    /// Reads the next full batch into freshly allocated buffers.
    ///
    /// Returns `Ok(None)` once the dataset is exhausted.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a batch file cannot be read; the cursor
    /// is not advanced.
    pub fn next_batch(&mut self) -> Result<Option<Batch>> {
        let index = self.cur_cnt;
        let mut buffers = BatchBuffers::for_manifest(&self.tensor_info);
        if self.try_read_next(&mut buffers.as_mut_slices(), None)? {
            Ok(Some(Batch { index, buffers }))
        } else {
            Ok(None)
        }
    }

    fn read_count(&self, num_datas: Option<usize>) -> usize {
        let total = self.tensor_info.len();
        num_datas.map_or(total, |n| n.min(total))
    }

    /// Root folder of the dataset.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn tensor_info(&self) -> &TensorManifest {
        &self.tensor_info
    }

    /// Number of batches this reader serves per pass.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Index of the batch the next successful read will return.
    pub fn cursor(&self) -> usize {
        self.cur_cnt
    }

    pub fn remaining(&self) -> usize {
        self.max_size - self.cur_cnt
    }

    pub fn is_exhausted(&self) -> bool {
        self.cur_cnt >= self.max_size
    }
}

impl std::fmt::Debug for DatasetReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetReader")
            .field("folder", &self.folder)
            .field("tensor_info", &self.tensor_info)
            .field("max_size", &self.max_size)
            .field("cur_cnt", &self.cur_cnt)
            .field("iter_failed", &self.iter_failed)
            .finish()
    }
}

impl Iterator for DatasetReader {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.iter_failed {
            return None;
        }
        match self.next_batch() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => None,
            Err(e) => {
                self.iter_failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Counts batch indices, from 0, for which every tensor has a file.
///
/// Stops at the first index with any file missing, or once `cap` is
/// reached. An empty manifest has no batches. A failed existence check
/// counts as missing.
fn count_complete_batches(
    storage: &dyn StorageBackend,
    folder: &Path,
    manifest: &TensorManifest,
    cap: Option<usize>,
) -> usize {
    if manifest.is_empty() {
        return 0;
    }

    let mut file_cnt = 0;
    while cap.map_or(true, |cap| file_cnt < cap) {
        let complete = manifest.iter().all(|spec| {
            storage
                .exists(&spec.batch_path(folder, file_cnt))
                .unwrap_or(false)
        });
        if !complete {
            break;
        }
        file_cnt += 1;
    }
    file_cnt
}

fn check_buffers(tensors: &[TensorSpec], buffers: &[&mut [u8]]) -> Result<()> {
    for (index, spec) in tensors.iter().enumerate() {
        let buffer = buffers
            .get(index)
            .ok_or_else(|| DatasetError::missing_buffer(index, buffers.len()))?;
        if buffer.len() < spec.byte_size {
            return Err(DatasetError::buffer_too_small(
                &spec.name,
                spec.byte_size,
                buffer.len(),
            ));
        }
    }
    Ok(())
}
