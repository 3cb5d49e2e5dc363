//! Deflate (zlib) codec via `flate2`.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::Codec;
use crate::error::{HandwireError, Result};

/// The `deflate` codec.
#[derive(Debug, Clone)]
pub struct DeflateCodec {
    level: Compression,
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl DeflateCodec {
    /// Codec with the default compression level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec with an explicit compression level (0-9).
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Codec for DeflateCodec {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder
            .write_all(data)
            .map_err(|e| HandwireError::Compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| HandwireError::Compression(e.to_string()))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| HandwireError::Decompression(e.to_string()))?;
        Ok(decompressed)
    }

    fn name(&self) -> &str {
        "deflate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let codec = DeflateCodec::new();
        let data = b"the quick brown fox jumps over the lazy dog".repeat(16);

        let compressed = codec.compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(codec.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_corrupt_input_fails_decompression() {
        let codec = DeflateCodec::new();
        let result = codec.decompress(b"definitely not zlib");
        assert!(matches!(result, Err(HandwireError::Decompression(_))));
    }

    #[test]
    fn test_explicit_level_round_trip() {
        let codec = DeflateCodec::with_level(9);
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaa";
        let compressed = codec.compress(data).unwrap();
        assert_eq!(codec.decompress(&compressed).unwrap(), data);
    }
}
