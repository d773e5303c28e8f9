//! Compression codecs.
//!
//! This module provides implementations of lossless data compression
//! algorithms behind a common [`Compression`] contract:
//! - Adaptive arithmetic coding (order-0 model, 16-bit range coder)
//! - Dictionary-based sliding-window compression (LZSS-style)
//! - Huffman coding
//!
//! # Examples
//!
//! ```rust
//! use squeeze::compression::{Compression, lzss::Lzss};
//!
//! let codec = Lzss::new();
//! let compressed = codec.compress(b"abracadabra abracadabra").unwrap();
//! let decompressed = codec.decompress(&compressed).unwrap();
//! assert_eq!(decompressed, b"abracadabra abracadabra");
//! ```

use crate::error::Error;

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for compression algorithms
pub trait Compression {
    /// Compress the input data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress the compressed data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Trait for streaming compression algorithms
pub trait StreamingCompression {
    /// Process a chunk of input data
    fn process(&mut self, chunk: &[u8]) -> Result<Vec<u8>>;

    /// Finish processing and return any remaining data
    fn finish(&mut self) -> Result<Vec<u8>>;
}

pub mod arithmetic;
pub mod bits;
pub mod huffman;
pub mod lzss;
pub mod stream;

pub use arithmetic::ArithmeticCoder;
pub use bits::BitSequence;
pub use huffman::HuffmanCoder;
pub use lzss::Lzss;
pub use stream::{BufferedCompressor, BufferedDecompressor};
