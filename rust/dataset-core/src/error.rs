// rust/dataset-core/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {

    #[error("Storage error at '{path}': {message}")]
    Storage {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Manifest '{path}' line {line}: {message}")]
    Manifest {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Buffer for tensor '{tensor}' too small: need {required} bytes, got {actual}")]
    BufferTooSmall {
        tensor: String,
        required: usize,
        actual: usize,
    },

    #[error("No buffer for tensor index {index} ({provided} buffers provided)")]
    MissingBuffer {
        index: usize,
        provided: usize,
    },

    #[error("Batch data for tensor '{tensor}' has {actual} bytes, expected {expected}")]
    BatchSize {
        tensor: String,
        expected: usize,
        actual: usize,
    },

    #[error("Batch has {actual} tensors, manifest declares {expected}")]
    TensorCount {
        expected: usize,
        actual: usize,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Comparison error: {message}")]
    Comparison {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, DatasetError>;

// Convenience constructors
impl DatasetError {

    pub fn storage(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_with_source(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn manifest(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    pub fn buffer_too_small(tensor: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::BufferTooSmall {
            tensor: tensor.into(),
            required,
            actual,
        }
    }

    pub fn missing_buffer(index: usize, provided: usize) -> Self {
        Self::MissingBuffer { index, provided }
    }

    pub fn batch_size(tensor: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::BatchSize {
            tensor: tensor.into(),
            expected,
            actual,
        }
    }

    pub fn tensor_count(expected: usize, actual: usize) -> Self {
        Self::TensorCount { expected, actual }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn comparison(message: impl Into<String>) -> Self {
        Self::Comparison {
            message: message.into(),
        }
    }
}
