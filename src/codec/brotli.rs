//! Brotli codec.
//!
//! High compression ratio for larger payloads at the cost of encode time.

use std::io::{Read, Write};

use brotli::{CompressorWriter, Decompressor};

use super::Codec;
use crate::error::{HandwireError, Result};

/// Compression quality (0-11, higher = better compression, slower).
const DEFAULT_QUALITY: u32 = 11;

/// Window size exponent (10-24).
const DEFAULT_WINDOW_SIZE: u32 = 22;

const BUFFER_SIZE: usize = 4096;

/// The `brotli` codec.
#[derive(Debug, Clone)]
pub struct BrotliCodec {
    quality: u32,
    window_size: u32,
}

impl Default for BrotliCodec {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl BrotliCodec {
    /// Codec with default quality and window size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec with an explicit quality (clamped to 0-11).
    pub fn with_quality(quality: u32) -> Self {
        Self {
            quality: quality.min(11),
            ..Self::default()
        }
    }
}

impl Codec for BrotliCodec {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut compressed = Vec::new();
        {
            let mut writer =
                CompressorWriter::new(&mut compressed, BUFFER_SIZE, self.quality, self.window_size);
            writer
                .write_all(data)
                .map_err(|e| HandwireError::Compression(e.to_string()))?;
        }
        Ok(compressed)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decompressor = Decompressor::new(data, BUFFER_SIZE);
        let mut decompressed = Vec::new();
        decompressor
            .read_to_end(&mut decompressed)
            .map_err(|e| HandwireError::Decompression(e.to_string()))?;
        Ok(decompressed)
    }

    fn name(&self) -> &str {
        "brotli"
    }
}
