// rust/dataset-core/src/dataset/manifest.rs

//! The `tensor_info` manifest.
//!
//! One line per tensor, `<name> <byte_size>`, split at the first space.
//! Line order fixes the positional order of buffers for every batch read.

use std::path::{Path, PathBuf};

use crate::error::{DatasetError, Result};
use crate::storage::StorageBackend;

/// File name of the manifest inside a dataset folder.
pub const MANIFEST_FILE: &str = "tensor_info";

/// A tensor name and the byte length of one of its batch files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorSpec {
    pub name: String,
    pub byte_size: usize,
}

impl TensorSpec {
    pub fn new(name: impl Into<String>, byte_size: usize) -> Self {
        Self {
            name: name.into(),
            byte_size,
        }
    }

    /// Path of this tensor's batch file for `index` under `folder`.
    pub fn batch_path(&self, folder: &Path, index: usize) -> PathBuf {
        folder.join(&self.name).join(batch_file_name(index))
    }
}

/// File name of the batch file for `index`, e.g. `batch_3.bin`.
pub fn batch_file_name(index: usize) -> String {
    format!("batch_{index}.bin")
}

/// Ordered list of tensors in a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TensorManifest {
    tensors: Vec<TensorSpec>,
}

impl TensorManifest {
    pub fn new(tensors: Vec<TensorSpec>) -> Self {
        Self { tensors }
    }

    /// Parses manifest text. `path` is only used in error messages.
    ///
    /// Empty lines are skipped and a trailing `\r` is dropped. Everything
    /// after the first space is the size field, which must be a
    /// non-negative integer.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::Manifest` for a line without a space, with an
    /// empty name, or with a size that does not parse.
    pub fn parse(text: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut tensors = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.is_empty() {
                continue;
            }

            let (name, size) = line.split_once(' ').ok_or_else(|| {
                DatasetError::manifest(path, line_no, format!("can not find space in line '{line}'"))
            })?;
            if name.is_empty() {
                return Err(DatasetError::manifest(path, line_no, "empty tensor name"));
            }

            let byte_size = size.trim().parse::<usize>().map_err(|e| {
                DatasetError::manifest(path, line_no, format!("invalid byte size '{size}': {e}"))
            })?;

            tensors.push(TensorSpec::new(name, byte_size));
        }

        Ok(Self { tensors })
    }

    /// Loads `<folder>/tensor_info` through `storage`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the manifest cannot be read, or a
    /// manifest error if it is not valid UTF-8 or fails to parse.
    pub fn load(storage: &dyn StorageBackend, folder: &Path) -> Result<Self> {
        let path = folder.join(MANIFEST_FILE);
        let bytes = storage.read_all(&path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| DatasetError::manifest(&path, 0, format!("not valid UTF-8: {e}")))?;
        Self::parse(&text, &path)
    }

    /// Renders the manifest in its on-disk form.
    pub fn to_manifest_string(&self) -> String {
        self.tensors
            .iter()
            .map(|spec| format!("{} {}\n", spec.name, spec.byte_size))
            .collect()
    }

    pub fn tensors(&self) -> &[TensorSpec] {
        &self.tensors
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TensorSpec> {
        self.tensors.get(index)
    }

    /// Position of the tensor called `name`, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.tensors.iter().position(|t| t.name == name)
    }

    /// Sum of all per-tensor byte sizes, i.e. the bytes in one full batch.
    pub fn total_batch_bytes(&self) -> usize {
        self.tensors.iter().map(|t| t.byte_size).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TensorSpec> {
        self.tensors.iter()
    }
}

impl<'a> IntoIterator for &'a TensorManifest {
    type Item = &'a TensorSpec;
    type IntoIter = std::slice::Iter<'a, TensorSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.tensors.iter()
    }
}
