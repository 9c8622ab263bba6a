//! The binary graph codec.
//!
//! Encodes everything reachable from a serde value into a text-safe blob and back. The blob layout
//! before base64 (standard alphabet, padded) is:
//!
//! ```text
//! [ MetaByte ] [ (compressed) bincode payload ]
//! ```
//!
//! The meta byte keeps the codec version in its high nibble and the compression algorithm ID in
//! bits 0-2, so blobs stay readable regardless of the options in effect when decoding.

use crate::compression::CompressorRegistry;
use crate::error::{Result, SnapshotError};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Current blob layout version.
pub const CODEC_VERSION: u8 = 1;

/// Per-blob flags stored in the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaByte(u8);

impl MetaByte {
    const COMPRESSION_MASK: u8 = 0b0000_0111; // Bits 0-2
    const VERSION_SHIFT: u8 = 4; // Bits 4-7

    /// Creates a meta byte for the current version.
    pub fn new(compression_id: u8) -> Self {
        Self((CODEC_VERSION << Self::VERSION_SHIFT) | (compression_id & Self::COMPRESSION_MASK))
    }

    /// Decodes the byte.
    pub fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// The layout version that produced the blob.
    pub fn version(&self) -> u8 {
        self.0 >> Self::VERSION_SHIFT
    }

    /// Returns the compression algorithm ID (0-7).
    pub fn compression_method(&self) -> u8 {
        self.0 & Self::COMPRESSION_MASK
    }

    /// Returns the raw byte representation.
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

/// Options applied when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecOptions {
    /// Compression algorithm ID. 0 = none, 1 = LZ4 (feature `lz4_flex`).
    pub compression_id: u8,
}

/// Encodes `value` and everything it owns into a base64 blob.
///
/// # Errors
/// Returns [`SnapshotError::Encoding`] if any reachable member refuses to serialize, and
/// [`SnapshotError::Compression`] if the requested algorithm is unavailable.
pub fn encode<T: Serialize + ?Sized>(value: &T, options: &CodecOptions) -> Result<String> {
    let payload = bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| SnapshotError::Encoding(e.to_string()))?;

    let compressor = CompressorRegistry::global().get(options.compression_id)?;
    let packed = compressor.compress(&payload)?;

    let mut buffer = Vec::with_capacity(packed.len() + 1);
    buffer.push(MetaByte::new(compressor.id()).as_u8());
    buffer.extend_from_slice(&packed);
    Ok(STANDARD.encode(buffer))
}

/// Decodes a blob produced by [`encode`]. Empty text yields `T::default()`.
///
/// # Errors
/// Returns [`SnapshotError::Decoding`] for malformed text or payloads of another type.
pub fn decode<T: DeserializeOwned + Default>(text: &str) -> Result<T> {
    if text.is_empty() {
        return Ok(T::default());
    }
    decode_required(text)
}

/// Like [`decode`], for types without a default: empty text is an error.
pub(crate) fn decode_required<T: DeserializeOwned>(text: &str) -> Result<T> {
    let bytes = STANDARD
        .decode(text)
        .map_err(|e| SnapshotError::Decoding(e.to_string()))?;
    let Some((&first, body)) = bytes.split_first() else {
        return Err(SnapshotError::Decoding("empty blob".into()));
    };

    let meta = MetaByte::from_byte(first);
    if meta.version() != CODEC_VERSION {
        return Err(SnapshotError::Decoding(format!(
            "unsupported blob version: {}",
            meta.version()
        )));
    }

    let compressor = CompressorRegistry::global().get(meta.compression_method())?;
    let payload = compressor.decompress(body)?;

    let (value, read) = bincode::serde::decode_from_slice(&payload, bincode::config::standard())
        .map_err(|e| SnapshotError::Decoding(e.to_string()))?;
    if read != payload.len() {
        return Err(SnapshotError::Decoding(format!(
            "{} trailing bytes after value",
            payload.len() - read
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serializer};
    use std::collections::BTreeMap;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Layer {
        name: String,
        opacity: f32,
        tags: BTreeMap<String, Vec<u32>>,
        parent: Option<Box<Layer>>,
    }

    struct Opaque;

    impl Serialize for Opaque {
        fn serialize<S: Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("opaque handles cannot be serialized"))
        }
    }

    #[derive(Serialize)]
    struct Holder {
        id: u32,
        handle: Opaque,
    }

    #[test]
    fn nested_graph_survives() -> Result<()> {
        let layer = Layer {
            name: "ink".into(),
            opacity: 0.5,
            tags: BTreeMap::from([("lines".to_string(), vec![1, 2, 3])]),
            parent: Some(Box::new(Layer {
                name: "paper".into(),
                ..Layer::default()
            })),
        };
        let blob = encode(&layer, &CodecOptions::default())?;
        assert!(blob.is_ascii());
        let back: Layer = decode(&blob)?;
        assert_eq!(back, layer);
        Ok(())
    }

    #[test]
    fn empty_text_is_the_default() -> Result<()> {
        let value: Layer = decode("")?;
        assert_eq!(value, Layer::default());
        Ok(())
    }

    #[test]
    fn unserializable_member_fails_without_panicking() {
        let holder = Holder {
            id: 1,
            handle: Opaque,
        };
        assert!(matches!(
            encode(&holder, &CodecOptions::default()),
            Err(SnapshotError::Encoding(_))
        ));
    }

    #[test]
    fn garbage_is_a_decoding_error() {
        assert!(matches!(decode::<u32>("!!not base64!!"), Err(SnapshotError::Decoding(_))));
    }

    #[test]
    fn meta_byte_layout() {
        let meta = MetaByte::new(1);
        assert_eq!(meta.version(), CODEC_VERSION);
        assert_eq!(meta.compression_method(), 1);
    }
}
