// rust/dataset-core/src/dataset/mod.rs

//! Per-tensor binary batch datasets.
//!
//! A dataset folder holds a `tensor_info` manifest and one directory per
//! tensor containing `batch_<n>.bin` files:
//!
//! ```text
//! <folder>/
//!   tensor_info          # "<name> <byte_size>" per line
//!   <name_1>/batch_0.bin
//!   <name_1>/batch_1.bin
//!   <name_2>/batch_0.bin
//!   ...
//! ```
//!
//! [`DatasetReader`] streams batches into caller buffers in manifest order;
//! [`DatasetWriter`] produces the layout.
//!
//! # Example
//!
//! ```no_run
//! use dataset_core::dataset::{BatchBuffers, DatasetReader};
//!
//! let mut reader = DatasetReader::open("calibration", None)?;
//! let mut buffers = BatchBuffers::for_manifest(reader.tensor_info());
//!
//! while reader.read_next_owned(&mut buffers, None) {
//!     // Feed buffers to the model
//! }
//! reader.reset();
//! # Ok::<(), dataset_core::DatasetError>(())
//! ```

mod buffers;
pub mod compare;
mod manifest;
mod reader;
mod writer;

pub use buffers::BatchBuffers;
pub use compare::{compare_buffers, CompareReport, ElementType, Tolerance};
pub use manifest::{batch_file_name, TensorManifest, TensorSpec, MANIFEST_FILE};
pub use reader::{Batch, DatasetReader};
pub use writer::DatasetWriter;
