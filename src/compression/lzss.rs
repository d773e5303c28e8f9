//! LZSS-style sliding-window dictionary compression.
//!
//! The compressor scans the input left to right, maintaining a window of the
//! already-consumed bytes (optionally bounded to the most recent
//! `max_search_buffer` bytes). Repeated runs are replaced with textual
//! back-reference tokens `<distance,length>`, where `distance` counts back
//! from the current position to the start of the matched run. A reference is
//! only emitted when its textual form is no longer than the run it replaces,
//! which bounds worst-case expansion on short or unprofitable matches.
//!
//! Because the token syntax reserves `<`, literal occurrences of the opening
//! delimiter are remapped to a private sentinel byte before compression, with
//! a secondary escape byte protecting literal occurrences of the sentinel and
//! of the escape byte itself. Decompression reverses the escaping in a
//! separate pass after token parsing, so the parser never misreads escaped
//! data as the start of a reference.
//!
//! Match search supports two strategies: a serial scan, and a concurrent
//! variant that dispatches one independent search task per input position and
//! merges the results sequentially. Both produce byte-identical output.

use log::debug;
use rayon::prelude::*;

use crate::compression::{Compression, Result};
use crate::error::Error;

const OPENING: u8 = b'<';
const SEPARATOR: u8 = b',';
const CLOSING: u8 = b'>';

/// Private-use stand-in for a literal opening delimiter.
const ENCODED_OPENING: u8 = 0xFF;
/// Escape byte protecting literal sentinel and escape bytes.
const ESCAPE: u8 = 0x5C;

/// Default bound on the search window, in bytes.
pub const DEFAULT_WINDOW_SIZE: usize = 4096;

/// How the compressor searches for matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Scan positions one at a time on the calling thread.
    #[default]
    Serial,
    /// Dispatch one search task per input position, then merge sequentially.
    Parallel,
}

/// A back-reference into the search window.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Match {
    /// Backward offset from the current position to the match start.
    distance: usize,
    /// Number of bytes the match covers.
    length: usize,
}

/// LZSS sliding-window codec.
///
/// # Example
///
/// ```
/// use squeeze::compression::{Compression, Lzss};
///
/// let codec = Lzss::new();
/// let input = b"abcabcabcabcabcabcabcabc";
/// let compressed = codec.compress(input).unwrap();
/// let decompressed = codec.decompress(&compressed).unwrap();
/// assert_eq!(decompressed, input);
/// ```
#[derive(Debug, Clone)]
pub struct Lzss {
    max_search_buffer: Option<usize>,
    search_mode: SearchMode,
}

impl Default for Lzss {
    fn default() -> Self {
        Self::new()
    }
}

impl Lzss {
    /// Create a codec with the default bounded window and serial search.
    pub fn new() -> Self {
        Lzss {
            max_search_buffer: Some(DEFAULT_WINDOW_SIZE),
            search_mode: SearchMode::Serial,
        }
    }

    /// Create a codec with an explicit window bound.
    ///
    /// `None` means the window is unbounded. `Some(0)` is rejected with
    /// [`Error::InvalidConfiguration`]: a zero-length window can never match.
    pub fn with_window(max_search_buffer: Option<usize>) -> Result<Self> {
        if max_search_buffer == Some(0) {
            return Err(Error::InvalidConfiguration(
                "search window bound must be nonzero; use None for unbounded".to_string(),
            ));
        }
        Ok(Lzss {
            max_search_buffer,
            search_mode: SearchMode::Serial,
        })
    }

    /// Select the match-search strategy.
    pub fn search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// The window visible from `pos`: the already-consumed prefix, truncated
    /// to the configured bound.
    fn bounded_window<'a>(&self, data: &'a [u8], pos: usize) -> &'a [u8] {
        let window = &data[..pos];
        match self.max_search_buffer {
            Some(max) if window.len() > max => &window[window.len() - max..],
            _ => window,
        }
    }

    fn compress_serial(&self, data: &[u8]) -> Vec<u8> {
        let mut output = Vec::with_capacity(data.len());
        let mut pos = 0;
        while pos < data.len() {
            let window = self.bounded_window(data, pos);
            match find_longest_match(window, &data[pos..]) {
                Some(found) => {
                    push_token(&mut output, &found, &data[pos..pos + found.length]);
                    pos += found.length;
                }
                None => {
                    output.push(data[pos]);
                    pos += 1;
                }
            }
        }
        output
    }

    fn compress_parallel(&self, data: &[u8]) -> Vec<u8> {
        // One search task per input position, each over an immutable view of
        // the window prefix. Indexed collection keeps results in input order
        // regardless of completion order.
        let results: Vec<Option<Match>> = (0..data.len())
            .into_par_iter()
            .map(|pos| find_longest_match(self.bounded_window(data, pos), &data[pos..]))
            .collect();

        // The merge walks results strictly in input order: a committed match
        // at position `pos` consumed the next `length - 1` positions, so
        // their precomputed results are skipped rather than re-examined.
        let mut output = Vec::with_capacity(data.len());
        let mut skip = 0usize;
        for (pos, result) in results.iter().enumerate() {
            if skip > 0 {
                skip -= 1;
                continue;
            }
            match result {
                Some(found) => {
                    skip = found.length - 1;
                    push_token(&mut output, found, &data[pos..pos + found.length]);
                }
                None => output.push(data[pos]),
            }
        }
        output
    }
}

impl Compression for Lzss {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let escaped = escape(data);
        let output = match self.search_mode {
            SearchMode::Serial => self.compress_serial(&escaped),
            SearchMode::Parallel => self.compress_parallel(&escaped),
        };
        debug!(
            "lzss ({:?}): compressed {} bytes to {} bytes",
            self.search_mode,
            data.len(),
            output.len()
        );
        Ok(output)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut output: Vec<u8> = Vec::with_capacity(data.len());
        let mut pos = 0;
        while pos < data.len() {
            if data[pos] != OPENING {
                output.push(data[pos]);
                pos += 1;
                continue;
            }

            let sep = scan_for(data, pos + 1, SEPARATOR)?;
            let close = scan_for(data, sep + 1, CLOSING)?;
            let distance = parse_decimal(&data[pos + 1..sep])?;
            let length = parse_decimal(&data[sep + 1..close])?;

            if distance == 0 || distance > output.len() {
                return Err(Error::MalformedData(format!(
                    "back-reference distance {} exceeds window of {} bytes",
                    distance,
                    output.len()
                )));
            }
            if length == 0 || length > distance {
                return Err(Error::MalformedData(format!(
                    "back-reference length {length} is invalid for distance {distance}"
                )));
            }

            let start = output.len() - distance;
            for offset in 0..length {
                let byte = output[start + offset];
                output.push(byte);
            }
            pos = close + 1;
        }
        Ok(unescape(&output))
    }
}

/// Find the longest run starting `lookahead` that occurs in `window`.
///
/// The search starts with a single byte and speculatively extends one byte at
/// a time, committing the longest run still found. Each length is located
/// independently, scanning from the window end backward so the most recent
/// occurrence (shortest distance) wins on ties.
fn find_longest_match(window: &[u8], lookahead: &[u8]) -> Option<Match> {
    let mut best = None;
    let mut length = 1;
    while length <= lookahead.len() {
        match rfind(window, &lookahead[..length]) {
            Some(index) => {
                best = Some(Match {
                    distance: window.len() - index,
                    length,
                });
                length += 1;
            }
            None => break,
        }
    }
    best
}

/// Index of the last occurrence of `needle` in `haystack`.
fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .rposition(|candidate| candidate == needle)
}

/// Append either the reference token or the literal run, whichever is shorter.
///
/// Ties go to the reference; both search strategies apply this identical rule
/// so their outputs stay byte-identical.
fn push_token(output: &mut Vec<u8>, found: &Match, run: &[u8]) {
    let token = format!("<{},{}>", found.distance, found.length);
    if token.len() <= found.length {
        output.extend_from_slice(token.as_bytes());
    } else {
        output.extend_from_slice(run);
    }
}

/// Position of the next `target` byte at or after `from`.
fn scan_for(data: &[u8], from: usize, target: u8) -> Result<usize> {
    data[from..]
        .iter()
        .position(|&b| b == target)
        .map(|offset| from + offset)
        .ok_or_else(|| Error::MalformedData("unterminated reference token".to_string()))
}

/// Parse a decimal ASCII integer from a token field.
fn parse_decimal(digits: &[u8]) -> Result<usize> {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| {
            Error::MalformedData(format!(
                "reference token field {:?} is not a decimal integer",
                String::from_utf8_lossy(digits)
            ))
        })
}

/// Remap literal opening delimiters to the sentinel byte, protecting literal
/// sentinel and escape bytes with the escape byte.
fn escape(data: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(data.len());
    for &byte in data {
        match byte {
            OPENING => encoded.push(ENCODED_OPENING),
            ENCODED_OPENING | ESCAPE => {
                encoded.push(ESCAPE);
                encoded.push(byte);
            }
            _ => encoded.push(byte),
        }
    }
    encoded
}

/// Reverse [`escape`]: an unescaped sentinel becomes the opening delimiter,
/// an escape byte passes the following byte through literally.
fn unescape(data: &[u8]) -> Vec<u8> {
    let mut decoded = Vec::with_capacity(data.len());
    let mut escaped = false;
    for &byte in data {
        if escaped {
            decoded.push(byte);
            escaped = false;
        } else if byte == ESCAPE {
            escaped = true;
        } else if byte == ENCODED_OPENING {
            decoded.push(OPENING);
        } else {
            decoded.push(byte);
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(codec: &Lzss, input: &[u8]) -> Vec<u8> {
        let compressed = codec.compress(input).unwrap();
        let decompressed = codec.decompress(&compressed).unwrap();
        assert_eq!(decompressed, input);
        compressed
    }

    #[test]
    fn test_empty_input() {
        let codec = Lzss::new();
        let compressed = round_trip(&codec, b"");
        assert!(compressed.is_empty());
    }

    #[test]
    fn test_no_repetition_stays_literal() {
        let codec = Lzss::new();
        let compressed = round_trip(&codec, b"abcdefg");
        assert_eq!(compressed, b"abcdefg");
    }

    #[test]
    fn test_short_run_rejected_by_smart_emission() {
        // Every reference here would be longer than the run it replaces.
        let codec = Lzss::new();
        let compressed = round_trip(&codec, b"AAAAAAAA");
        assert_eq!(compressed, b"AAAAAAAA");
    }

    #[test]
    fn test_long_run_emits_reference() {
        let codec = Lzss::new();
        let input = vec![b'A'; 64];
        let compressed = round_trip(&codec, &input);
        assert!(compressed.len() < input.len());
        assert!(compressed.contains(&OPENING));
    }

    #[test]
    fn test_repeated_phrase() {
        let codec = Lzss::new();
        let input = b"abracadabra abracadabra abracadabra abracadabra";
        let compressed = round_trip(&codec, input);
        assert!(compressed.len() < input.len());
    }

    #[test]
    fn test_delimiter_bytes_survive() {
        let codec = Lzss::new();
        round_trip(&codec, b"a<b,c>d");
        round_trip(&codec, &[OPENING, ENCODED_OPENING, ESCAPE, OPENING]);
        round_trip(&codec, &[ESCAPE; 7]);
        round_trip(&codec, &[ENCODED_OPENING; 7]);
    }

    #[test]
    fn test_all_byte_values() {
        let codec = Lzss::new();
        let input: Vec<u8> = (0..=255u8).collect();
        round_trip(&codec, &input);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let serial = Lzss::new();
        let parallel = Lzss::new().search_mode(SearchMode::Parallel);
        let inputs: Vec<Vec<u8>> = vec![
            Vec::new(),
            b"abcdefg".to_vec(),
            vec![b'A'; 200],
            b"the quick brown fox jumps over the lazy dog the quick brown fox".to_vec(),
            (0..1000u32).map(|i| (i % 7) as u8 + b'a').collect(),
        ];
        for input in inputs {
            let a = serial.compress(&input).unwrap();
            let b = parallel.compress(&input).unwrap();
            assert_eq!(a, b);
            assert_eq!(parallel.decompress(&b).unwrap(), input);
        }
    }

    #[test]
    fn test_pseudo_random_round_trip() {
        use rand::{RngCore, SeedableRng};
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0x5EED);
        let mut input = vec![0u8; 2048];
        rng.fill_bytes(&mut input);
        let serial = Lzss::new();
        let parallel = Lzss::new().search_mode(SearchMode::Parallel);
        let compressed = round_trip(&serial, &input);
        assert_eq!(parallel.compress(&input).unwrap(), compressed);
    }

    #[test]
    fn test_bounded_window_limits_distance() {
        let codec = Lzss::with_window(Some(16)).unwrap();
        let mut input = vec![b'x'; 64];
        input.extend_from_slice(b"0123456789abcdef");
        input.extend(vec![b'x'; 64]);
        round_trip(&codec, &input);
    }

    #[test]
    fn test_unbounded_window() {
        let codec = Lzss::with_window(None).unwrap();
        let input: Vec<u8> = b"0123456789"
            .iter()
            .cycle()
            .take(5000)
            .copied()
            .collect();
        let compressed = round_trip(&codec, &input);
        assert!(compressed.len() < input.len());
    }

    #[test]
    fn test_zero_window_is_rejected() {
        assert!(matches!(
            Lzss::with_window(Some(0)),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_bounded_expansion() {
        // Escaping is the only source of growth, at most one byte per byte.
        let codec = Lzss::new();
        let worst: Vec<u8> = [ESCAPE, ENCODED_OPENING]
            .iter()
            .cycle()
            .take(256)
            .copied()
            .collect();
        let compressed = codec.compress(&worst).unwrap();
        assert!(compressed.len() <= worst.len() * 2);
    }

    #[test]
    fn test_decompress_rejects_unterminated_token() {
        let codec = Lzss::new();
        assert!(matches!(
            codec.decompress(b"abc<12,"),
            Err(Error::MalformedData(_))
        ));
        assert!(matches!(
            codec.decompress(b"abc<12"),
            Err(Error::MalformedData(_))
        ));
    }

    #[test]
    fn test_decompress_rejects_bad_distance() {
        let codec = Lzss::new();
        assert!(matches!(
            codec.decompress(b"ab<9,1>"),
            Err(Error::MalformedData(_))
        ));
        assert!(matches!(
            codec.decompress(b"ab<1,5>"),
            Err(Error::MalformedData(_))
        ));
    }

    #[test]
    fn test_decompress_rejects_non_numeric_token() {
        let codec = Lzss::new();
        assert!(matches!(
            codec.decompress(b"ab<x,1>"),
            Err(Error::MalformedData(_))
        ));
    }

    #[test]
    fn test_reference_resolves_against_fresh_output() {
        // The second reference copies bytes the first reference produced.
        let codec = Lzss::new();
        let input = b"abcdabcdabcdabcdabcdabcdabcdabcd";
        round_trip(&codec, input);
    }
}
