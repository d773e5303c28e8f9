//! Buffering adapters between the whole-buffer codecs and the
//! [`StreamingCompression`] contract.
//!
//! Both codecs in this crate are whole-buffer transforms, so the adapters
//! simply accumulate every chunk and run a single compress or decompress
//! call when the stream is finished. They add no incremental codec state.

use crate::compression::{Compression, Result, StreamingCompression};

/// Buffers written chunks and compresses them all at once on `finish`.
pub struct BufferedCompressor<C: Compression> {
    codec: C,
    buffer: Vec<u8>,
}

impl<C: Compression> BufferedCompressor<C> {
    /// Wrap a codec in a buffering streaming adapter.
    pub fn new(codec: C) -> Self {
        BufferedCompressor {
            codec,
            buffer: Vec::new(),
        }
    }
}

impl<C: Compression> StreamingCompression for BufferedCompressor<C> {
    fn process(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);
        Ok(Vec::new())
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        let data = std::mem::take(&mut self.buffer);
        self.codec.compress(&data)
    }
}

/// Buffers written chunks and decompresses them all at once on `finish`.
pub struct BufferedDecompressor<C: Compression> {
    codec: C,
    buffer: Vec<u8>,
}

impl<C: Compression> BufferedDecompressor<C> {
    /// Wrap a codec in a buffering streaming adapter.
    pub fn new(codec: C) -> Self {
        BufferedDecompressor {
            codec,
            buffer: Vec::new(),
        }
    }
}

impl<C: Compression> StreamingCompression for BufferedDecompressor<C> {
    fn process(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);
        Ok(Vec::new())
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        let data = std::mem::take(&mut self.buffer);
        self.codec.decompress(&data)
    }
}
