// rust/dataset-core/src/storage/mod.rs

//! Storage abstraction for the dataset reader.
//!
//! Two layers live here:
//!
//! - **Primitives** (`file_exists`, `read_to_buffer`): stateless helpers
//!   reporting success as a plain `bool`.
//! - **Backends** (`StorageBackend`, `LocalStorage`): the same operations
//!   with structured errors, plus the write side used by the dataset
//!   writer. The reader is generic over the backend so tests can inject
//!   faults.
//!
//! # Example
//!
//! ```no_run
//! use dataset_core::storage::{file_exists, read_to_buffer};
//!
//! let path = "dataset/input/batch_0.bin";
//! if file_exists(path) {
//!     let mut buf = vec![0u8; 1024];
//!     assert!(read_to_buffer(path, &mut buf));
//! }
//! ```

mod local;
mod traits;

pub use local::{file_exists, read_to_buffer, LocalStorage};
pub use traits::StorageBackend;
