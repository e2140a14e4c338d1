//! Value Transform Module
//!
//! Hook points for compression and encryption of serialized payloads.
//! The default is a pass-through; real codecs drop in behind the same trait.

use crate::error::Result;

// == Value Transform Trait ==
/// Encode/decode pipeline applied to a serialized value before it is stored
/// and after it is loaded. `encode` runs compression then encryption order
/// on write; `decode` reverses it on read.
pub trait ValueTransform: Send + Sync {
    /// Transforms a serialized payload for storage.
    fn encode(&self, value: &str) -> Result<String>;

    /// Reverses [`ValueTransform::encode`].
    fn decode(&self, value: &str) -> Result<String>;

    /// True when `encode` compresses the payload; recorded on the entry so
    /// the read path knows to reverse it.
    fn compresses(&self) -> bool {
        false
    }

    /// True when `encode` encrypts the payload.
    fn encrypts(&self) -> bool {
        false
    }
}

// == No-op Transform ==
/// Default transform: returns the payload unchanged.
#[derive(Debug, Default)]
pub struct NoopTransform;

impl ValueTransform for NoopTransform {
    fn encode(&self, value: &str) -> Result<String> {
        Ok(value.to_string())
    }

    fn decode(&self, value: &str) -> Result<String> {
        Ok(value.to_string())
    }
}
