//! Codec registry, pipeline chaining, and benchmark reporting.
//!
//! The engine is a thin layer over the codecs in [`crate::compression`]: a
//! closed enumeration maps algorithm names to codec instances, pipelines
//! chain codecs in order (decompression applies the reverse order), and
//! [`benchmark`] runs one full round trip and reports sizes, ratio, input
//! entropy, and timings.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use log::debug;

use crate::compression::{ArithmeticCoder, Compression, HuffmanCoder, Lzss};
use crate::error::{Error, Result};

/// The closed set of codecs the engine can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Adaptive arithmetic coding.
    Arithmetic,
    /// Huffman coding.
    Huffman,
    /// LZSS sliding-window dictionary compression.
    Lzss,
}

impl Algorithm {
    /// The canonical name used for lookup and display.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Arithmetic => "arithmetic",
            Algorithm::Huffman => "huffman",
            Algorithm::Lzss => "lzss",
        }
    }

    /// Construct the codec for this algorithm.
    pub fn codec(self) -> Box<dyn Compression> {
        match self {
            Algorithm::Arithmetic => Box::new(ArithmeticCoder::new()),
            Algorithm::Huffman => Box::new(HuffmanCoder::new()),
            Algorithm::Lzss => Box::new(Lzss::new()),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "arithmetic" => Ok(Algorithm::Arithmetic),
            "huffman" => Ok(Algorithm::Huffman),
            "lzss" => Ok(Algorithm::Lzss),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown algorithm: {other}"
            ))),
        }
    }
}

/// Compress `data` through each algorithm in order.
pub fn compress_pipeline(algorithms: &[Algorithm], data: &[u8]) -> Result<Vec<u8>> {
    if algorithms.is_empty() {
        return Err(Error::InvalidConfiguration(
            "pipeline needs at least one algorithm".to_string(),
        ));
    }
    let mut current = data.to_vec();
    for algorithm in algorithms {
        current = algorithm.codec().compress(&current)?;
        debug!("pipeline: {algorithm} stage produced {} bytes", current.len());
    }
    Ok(current)
}

/// Invert [`compress_pipeline`]: decompress through the algorithms in
/// reverse order.
pub fn decompress_pipeline(algorithms: &[Algorithm], data: &[u8]) -> Result<Vec<u8>> {
    if algorithms.is_empty() {
        return Err(Error::InvalidConfiguration(
            "pipeline needs at least one algorithm".to_string(),
        ));
    }
    let mut current = data.to_vec();
    for algorithm in algorithms.iter().rev() {
        current = algorithm.codec().decompress(&current)?;
    }
    Ok(current)
}

/// Outcome of one benchmarked round trip.
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    /// The pipeline that was measured.
    pub algorithms: Vec<Algorithm>,
    /// Input size in bytes.
    pub original_len: usize,
    /// Compressed size in bytes.
    pub compressed_len: usize,
    /// Compressed size as a fraction of the input size.
    pub ratio: f64,
    /// Shannon entropy of the input, in bits per byte.
    pub entropy: f64,
    /// Whether the round trip reproduced the input exactly.
    pub lossless: bool,
    /// Wall-clock time spent compressing.
    pub compress_time: Duration,
    /// Wall-clock time spent decompressing.
    pub decompress_time: Duration,
}

/// Run one compress/decompress round trip and report on it.
pub fn benchmark(algorithms: &[Algorithm], data: &[u8]) -> Result<BenchmarkReport> {
    let started = Instant::now();
    let compressed = compress_pipeline(algorithms, data)?;
    let compress_time = started.elapsed();

    let started = Instant::now();
    let decompressed = decompress_pipeline(algorithms, &compressed)?;
    let decompress_time = started.elapsed();

    let ratio = if data.is_empty() {
        1.0
    } else {
        compressed.len() as f64 / data.len() as f64
    };

    Ok(BenchmarkReport {
        algorithms: algorithms.to_vec(),
        original_len: data.len(),
        compressed_len: compressed.len(),
        ratio,
        entropy: shannon_entropy(data),
        lossless: decompressed == data,
        compress_time,
        decompress_time,
    })
}

/// Shannon entropy of `data` in bits per byte.
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut counts = [0usize; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }
    let len = data.len() as f64;
    counts
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}
