//! Payload Module
//!
//! Stored form of a cached value. Values whose JSON encoding exceeds the
//! instance's compression threshold are kept as LZ4-compressed bytes and
//! decoded on every read.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

// == Payload Error ==
/// Failure to turn a compressed payload back into a value.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("lz4 block is corrupt: {0}")]
    Decompress(#[from] lz4_flex::block::DecompressError),

    #[error("decompressed bytes are not a valid value: {0}")]
    Deserialize(#[from] serde_json::Error),
}

// == Payload ==
/// A cached value, either as-is or compressed.
#[derive(Debug, Clone)]
pub enum Payload<T> {
    Raw(T),
    Compressed {
        /// Size-prepended LZ4 block of the JSON encoding
        bytes: Vec<u8>,
        /// Length of the JSON encoding before compression
        original_size: usize,
    },
}

impl<T> Payload<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    // == Encode ==
    /// Wraps `value`, compressing it when its JSON encoding is larger than
    /// `threshold` bytes.
    ///
    /// A value that cannot be serialized, or whose JSON encoding does not
    /// parse back into a `T` (non-finite floats are written as `null`), is
    /// stored raw.
    pub fn encode(value: T, threshold: usize) -> Self {
        let serialized = match serde_json::to_vec(&value) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("Payload size check failed, storing uncompressed: {}", err);
                return Payload::Raw(value);
            }
        };

        if serialized.len() <= threshold {
            return Payload::Raw(value);
        }

        if let Err(err) = serde_json::from_slice::<T>(&serialized) {
            debug!("Payload does not survive a JSON round trip, storing uncompressed: {}", err);
            return Payload::Raw(value);
        }

        Payload::Compressed {
            bytes: lz4_flex::compress_prepend_size(&serialized),
            original_size: serialized.len(),
        }
    }

    // == Decode ==
    /// Returns an owned copy of the stored value.
    pub fn decode(&self) -> Result<T, PayloadError> {
        match self {
            Payload::Raw(value) => Ok(value.clone()),
            Payload::Compressed { bytes, .. } => {
                let raw = lz4_flex::decompress_size_prepended(bytes)?;
                Ok(serde_json::from_slice(&raw)?)
            }
        }
    }
}

impl<T> Payload<T> {
    pub fn is_compressed(&self) -> bool {
        matches!(self, Payload::Compressed { .. })
    }
}
