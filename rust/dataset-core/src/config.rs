// rust/dataset-core/src/config.rs

//! Configuration for dataset tooling.
//!
//! This module provides configuration parsing from TOML files, environment
//! variable overrides, and validation of configuration values. The reader
//! itself takes plain arguments; this configuration is what tools built on
//! top of it (such as `dataset-inspect`) load.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::dataset::compare::{ElementType, DEFAULT_MAX_REPORT};
use crate::error::{DatasetError, Result};

// Top-level tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    pub dataset: DatasetConfig,
    pub compare: CompareConfig,
}

/// Dataset reader options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    // Dataset folder containing the `tensor_info` manifest.
    pub folder: PathBuf,
    // Cap on the number of batches served per pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_batches: Option<usize>,
    // Number of leading tensors read per batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_datas: Option<usize>,
}

/// Golden/result comparison options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Element type used to interpret batch bytes.
    pub dtype: ElementType,
    /// Absolute tolerance for floating-point elements.
    pub atol: f64,
    /// Relative tolerance for floating-point elements.
    pub rtol: f64,
    /// Number of mismatching elements listed per tensor.
    pub max_report: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("./dataset"),
            max_batches: None,
            num_datas: None,
        }
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            dtype: ElementType::F32,
            atol: 1e-5,
            rtol: 1e-5,
            max_report: DEFAULT_MAX_REPORT,
        }
    }
}

impl FromStr for InspectConfig {
    type Err = DatasetError;

    /// Parse configuration from a TOML string.
    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| DatasetError::config_with_source("failed to parse TOML config", e))
    }
}

impl InspectConfig {
    // Load configuration from a TOML file.
    //
    // # Errors
    //
    // Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DatasetError::storage_with_source(path, "failed to read config file", e)
        })?;
        let config: Self = content.parse()?;
        config.validate()?;
        Ok(config)
    }

    // Apply environment variable overrides.
    //
    // Environment variables are prefixed with `DSR_` and use underscores
    // to separate nested fields. For example:
    // - `DSR_DATASET_FOLDER` overrides `dataset.folder`
    // - `DSR_DATASET_MAX_BATCHES` overrides `dataset.max_batches`
    // - `DSR_COMPARE_DTYPE` overrides `compare.dtype`
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        // Dataset overrides
        if let Ok(val) = std::env::var("DSR_DATASET_FOLDER") {
            self.dataset.folder = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("DSR_DATASET_MAX_BATCHES") {
            if let Ok(v) = val.parse() {
                self.dataset.max_batches = Some(v);
            }
        }
        if let Ok(val) = std::env::var("DSR_DATASET_NUM_DATAS") {
            if let Ok(v) = val.parse() {
                self.dataset.num_datas = Some(v);
            }
        }

        // Compare overrides
        if let Ok(val) = std::env::var("DSR_COMPARE_DTYPE") {
            if let Ok(v) = val.parse() {
                self.compare.dtype = v;
            }
        }
        if let Ok(val) = std::env::var("DSR_COMPARE_ATOL") {
            if let Ok(v) = val.parse() {
                self.compare.atol = v;
            }
        }
        if let Ok(val) = std::env::var("DSR_COMPARE_RTOL") {
            if let Ok(v) = val.parse() {
                self.compare.rtol = v;
            }
        }
        if let Ok(val) = std::env::var("DSR_COMPARE_MAX_REPORT") {
            if let Ok(v) = val.parse() {
                self.compare.max_report = v;
            }
        }

        self
    }

    // Validate all configuration values.
    //
    // # Errors
    //
    // Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.dataset.folder.as_os_str().is_empty() {
            return Err(DatasetError::config("dataset.folder must not be empty"));
        }

        if self.compare.atol.is_nan() || self.compare.atol < 0.0 {
            return Err(DatasetError::config(
                "compare.atol must be a non-negative number",
            ));
        }
        if self.compare.rtol.is_nan() || self.compare.rtol < 0.0 {
            return Err(DatasetError::config(
                "compare.rtol must be a non-negative number",
            ));
        }
        if self.compare.max_report == 0 {
            return Err(DatasetError::config(
                "compare.max_report must be greater than 0",
            ));
        }

        Ok(())
    }
}
