pub mod compression;
pub mod engine;
pub mod error;

pub use compression::{Compression, StreamingCompression};
pub use engine::Algorithm;
pub use error::{Error, Result};
