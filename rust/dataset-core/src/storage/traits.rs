// rust/dataset-core/src/storage/traits.rs

//! Storage abstraction traits for the dataset reader.
//!
//! The reader only needs two things from storage: whether a batch file is
//! present and a way to copy its bytes into a caller buffer. The writer
//! additionally needs to create, list and delete directories and files.

use std::path::Path;

use crate::error::Result;

/// The core storage backend trait.
///
/// Every operation opens and releases its own handle; implementations must
/// not keep files open between calls.
///
/// # Object Safety
///
/// This trait is object-safe and can be used with `Arc<dyn StorageBackend>`.
pub trait StorageBackend: Send + Sync {
    /// Checks if an object at the given path can be opened for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check itself fails. A missing
    /// object is `Ok(false)`, not an error.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Reads exactly `buffer.len()` bytes from the start of the object.
    ///
    /// A short object is a failure; trailing bytes beyond `buffer.len()`
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be opened or does not hold
    /// enough bytes.
    fn read_into(&self, path: &Path, buffer: &mut [u8]) -> Result<()>;

    /// Reads the whole object into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be opened or read.
    fn read_all(&self, path: &Path) -> Result<Vec<u8>>;

    /// Writes `data` to the object, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be created or written.
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Deletes a single object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist or cannot be removed.
    fn delete(&self, path: &Path) -> Result<()>;

    /// Lists entry names directly under `dir`, sorted.
    ///
    /// A missing directory lists as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not a directory or cannot be read.
    fn list(&self, dir: &Path) -> Result<Vec<String>>;

    /// Creates a directory and all parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
}
