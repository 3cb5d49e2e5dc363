//! Named compression codecs.
//!
//! Orthogonal to negotiation and framing: the protocol core never calls
//! into this module. Transports that compress payloads select a strategy by
//! name and delegate through the uniform [`Codec`] capability set.
//!
//! | Name      | Codec          | Notes                              |
//! |-----------|----------------|------------------------------------|
//! | `null`    | [`NullCodec`]  | Identity; the default              |
//! | `deflate` | [`DeflateCodec`] | zlib via `flate2`                |
//! | `brotli`  | [`BrotliCodec`] | High ratio for larger payloads    |

mod brotli;
mod deflate;
mod null;

use std::collections::HashMap;
use std::sync::Arc;

pub use brotli::BrotliCodec;
pub use deflate::DeflateCodec;
pub use null::NullCodec;

use crate::error::{HandwireError, Result};

/// A named compression strategy.
pub trait Codec: Send + Sync {
    /// Compress a buffer.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress a buffer; fails with a decompression error on corrupt or
    /// incompatible input.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Name this codec is registered under.
    fn name(&self) -> &str;
}

/// Codec lookup table keyed by name.
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn Codec>>,
}

impl Default for CodecRegistry {
    /// Registry with all built-in codecs.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(NullCodec));
        registry.register(Arc::new(DeflateCodec::new()));
        registry.register(Arc::new(BrotliCodec::new()));
        registry
    }
}

impl CodecRegistry {
    /// Registry with the built-in codecs registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with no codecs.
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Register a codec under its own name, replacing any previous one.
    pub fn register(&mut self, codec: Arc<dyn Codec>) {
        self.codecs.insert(codec.name().to_string(), codec);
    }

    /// Look up a codec by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Codec>> {
        self.codecs
            .get(name)
            .cloned()
            .ok_or_else(|| HandwireError::UnknownCodec(name.to_string()))
    }

    /// Registered codec names, unordered.
    pub fn names(&self) -> Vec<&str> {
        self.codecs.keys().map(String::as_str).collect()
    }
}

/// Composite codec: selects a concrete variant by name and delegates.
#[derive(Clone)]
pub struct NamedCodec {
    inner: Arc<dyn Codec>,
}

impl Default for NamedCodec {
    /// The null (identity) variant.
    fn default() -> Self {
        Self {
            inner: Arc::new(NullCodec),
        }
    }
}

impl NamedCodec {
    /// Select a variant by name from a registry.
    pub fn from_registry(registry: &CodecRegistry, name: &str) -> Result<Self> {
        Ok(Self {
            inner: registry.get(name)?,
        })
    }
}

impl Codec for NamedCodec {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.inner.compress(data)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.inner.decompress(data)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_builtins() {
        let registry = CodecRegistry::new();
        for name in ["null", "deflate", "brotli"] {
            assert_eq!(registry.get(name).unwrap().name(), name);
        }
    }

    #[test]
    fn test_registry_unknown_name() {
        let registry = CodecRegistry::new();
        assert!(matches!(
            registry.get("snappy"),
            Err(HandwireError::UnknownCodec(_))
        ));
    }

    #[test]
    fn test_named_codec_defaults_to_null() {
        let codec = NamedCodec::default();
        assert_eq!(codec.name(), "null");
        let data = b"unchanged";
        assert_eq!(codec.compress(data).unwrap(), data);
        assert_eq!(codec.decompress(data).unwrap(), data);
    }

    #[test]
    fn test_named_codec_delegates_selected_variant() {
        let registry = CodecRegistry::new();
        let codec = NamedCodec::from_registry(&registry, "deflate").unwrap();
        assert_eq!(codec.name(), "deflate");

        let data = b"abcabcabcabcabcabc";
        let compressed = codec.compress(data).unwrap();
        assert_eq!(codec.decompress(&compressed).unwrap(), data);
    }
}
