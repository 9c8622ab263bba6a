//! Pluggable compression for codec blobs.
//!
//! A blob records the ID of the algorithm that produced it in its meta byte, so a blob written
//! with compression enabled still decodes after the option is switched off. This module defines the
//! `Compressor` trait and a registry mapping IDs to algorithms.

use crate::error::{Result, SnapshotError};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Interface for compression algorithms.
///
/// Each compressor is identified by a unique ID in `0..8`.
pub trait Compressor: Send + Sync + std::fmt::Debug {
    /// Returns the unique ID stored in the blob meta byte.
    /// 0 is reserved for no compression.
    fn id(&self) -> u8;

    /// Compresses the data. May borrow the input if nothing is done.
    fn compress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>>;

    /// Decompresses the data.
    fn decompress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>>;
}

// --- No Compression (Pass-through) ---

/// A compressor that performs no compression (ID 0).
#[derive(Debug, Clone, Copy)]
pub struct NoCompression;

impl Compressor for NoCompression {
    fn id(&self) -> u8 {
        0
    }

    fn compress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(data))
    }

    fn decompress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(data))
    }
}

// --- LZ4 Implementation ---

#[cfg(feature = "lz4_flex")]
/// A compressor using the LZ4 block format with a prepended size (ID 1).
///
/// Available when the `lz4_flex` feature is enabled.
#[derive(Debug, Clone, Copy)]
pub struct Lz4Compressor;

#[cfg(feature = "lz4_flex")]
impl Compressor for Lz4Compressor {
    fn id(&self) -> u8 {
        1
    }

    fn compress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Owned(lz4_flex::compress_prepend_size(data)))
    }

    fn decompress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let vec = lz4_flex::decompress_size_prepended(data)
            .map_err(|e| SnapshotError::Compression(e.to_string()))?;
        Ok(Cow::Owned(vec))
    }
}

// --- REGISTRY ---

/// Maps algorithm IDs (stored in blobs) to `Compressor` implementations.
#[derive(Debug)]
pub struct CompressorRegistry {
    algorithms: Vec<Option<Box<dyn Compressor>>>,
}

impl CompressorRegistry {
    /// Creates a new registry with default algorithms registered.
    ///
    /// *   ID 0: `NoCompression`
    /// *   ID 1: `Lz4Compressor` (if `lz4_flex` feature is enabled)
    pub fn new() -> Self {
        let mut reg = Self {
            algorithms: (0..8).map(|_| None).collect(),
        };

        reg.register(Box::new(NoCompression));

        #[cfg(feature = "lz4_flex")]
        reg.register(Box::new(Lz4Compressor));

        reg
    }

    /// The process-wide default registry used by the codec.
    pub fn global() -> &'static CompressorRegistry {
        static GLOBAL: OnceLock<CompressorRegistry> = OnceLock::new();
        GLOBAL.get_or_init(CompressorRegistry::new)
    }

    /// Registers a compressor in the slot given by its ID, replacing any previous one.
    pub fn register(&mut self, algo: Box<dyn Compressor>) {
        let id = usize::from(algo.id());
        if id >= self.algorithms.len() {
            self.algorithms.resize_with(id + 1, || None);
        }
        if let Some(slot) = self.algorithms.get_mut(id) {
            *slot = Some(algo);
        }
    }

    /// Retrieves a compressor by its ID.
    ///
    /// # Errors
    /// Returns `SnapshotError::Compression` if the ID is not registered.
    pub fn get(&self, id: u8) -> Result<&dyn Compressor> {
        if let Some(algo) = self
            .algorithms
            .get(usize::from(id))
            .and_then(|opt| opt.as_ref())
        {
            return Ok(algo.as_ref());
        }

        Err(SnapshotError::Compression(format!(
            "algorithm ID {id} is not registered or available"
        )))
    }

    /// True if an algorithm is registered under `id`.
    pub fn supports(&self, id: u8) -> bool {
        self.get(id).is_ok()
    }
}

impl Default for CompressorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_through_is_always_available() -> Result<()> {
        let registry = CompressorRegistry::new();
        let algo = registry.get(0)?;
        let packed = algo.compress(b"abc")?;
        assert_eq!(algo.decompress(&packed)?.as_ref(), b"abc");
        Ok(())
    }

    #[test]
    fn unknown_ids_are_errors() {
        let registry = CompressorRegistry::new();
        assert!(matches!(registry.get(7), Err(SnapshotError::Compression(_))));
    }

    #[cfg(feature = "lz4_flex")]
    #[test]
    fn lz4_round_trip() -> Result<()> {
        let data = vec![0xAB_u8; 4096];
        let algo = CompressorRegistry::new().get(1)?.id();
        assert_eq!(algo, 1);
        let packed = Lz4Compressor.compress(&data)?;
        assert!(packed.len() < data.len());
        assert_eq!(Lz4Compressor.decompress(&packed)?.as_ref(), data.as_slice());
        Ok(())
    }
}
