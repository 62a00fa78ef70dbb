// rust/dataset-core/src/lib.rs

//! Dataset Reader - Core Library
//!
//! This crate reads datasets stored as one directory of binary batch files
//! per tensor, streaming them batch by batch into caller-provided buffers.
//! It also provides the storage primitives the reader is built on, a writer
//! for the same layout, and element-wise buffer comparison.

pub mod config;
pub mod error;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::InspectConfig;
pub use error::{DatasetError, Result};
pub use storage::{file_exists, read_to_buffer, LocalStorage, StorageBackend};

pub mod dataset;
pub use dataset::{
    compare_buffers, Batch, BatchBuffers, CompareReport, DatasetReader, DatasetWriter,
    ElementType, TensorManifest, TensorSpec, Tolerance,
};
