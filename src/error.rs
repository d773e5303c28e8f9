//! Unified error type for the crate.
//!
//! All codecs surface failures through the same [`Error`] enum rather than
//! panicking. Detected corruption is fatal for the call in progress; no codec
//! retries or self-heals.

use thiserror::Error;

/// Errors returned by the compression codecs and the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The input to an operation was not acceptable (e.g. converting a
    /// non-byte-aligned bit sequence to bytes).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Compressed data failed to parse: a missing padding sentinel, an
    /// unterminated or non-numeric reference token, an out-of-range
    /// back-reference, or an arithmetic symbol lookup miss.
    #[error("Malformed compressed data: {0}")]
    MalformedData(String),

    /// A codec or the engine was configured with invalid parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
