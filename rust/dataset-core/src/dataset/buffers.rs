// rust/dataset-core/src/dataset/buffers.rs

use super::manifest::TensorManifest;

/// One owned, zero-initialized buffer per tensor, sized from a manifest.
///
/// Useful when the caller has no pre-allocated memory of its own; pass
/// [`BatchBuffers::as_mut_slices`] to `DatasetReader::read_next` or use
/// `DatasetReader::read_next_owned`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchBuffers {
    buffers: Vec<Vec<u8>>,
}

impl BatchBuffers {
    pub fn for_manifest(manifest: &TensorManifest) -> Self {
        Self {
            buffers: manifest.iter().map(|t| vec![0u8; t.byte_size]).collect(),
        }
    }

    /// Destination slices in manifest order.
    pub fn as_mut_slices(&mut self) -> Vec<&mut [u8]> {
        self.buffers.iter_mut().map(Vec::as_mut_slice).collect()
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.buffers.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.buffers.iter().map(Vec::as_slice)
    }

    /// Zeroes every buffer in place.
    pub fn clear(&mut self) {
        for buf in &mut self.buffers {
            buf.fill(0);
        }
    }

    pub fn into_inner(self) -> Vec<Vec<u8>> {
        self.buffers
    }
}
