//! Adaptive arithmetic coding implementation.
//!
//! Arithmetic coding represents an entire message as a single sub-interval of
//! `[0, 1)`, narrowed symbol by symbol according to each symbol's probability.
//! This implementation uses the classic Witten–Neal–Cleary integer range coder
//! with 16-bit registers and underflow (E3) rescaling, driven by an adaptive
//! order-0 model over 257 symbols: the 256 byte values plus a distinguished
//! end-of-stream symbol.
//!
//! The model starts uniform and is updated after every coded symbol, so the
//! decoder reconstructs probabilities it never received explicitly. Encoder
//! and decoder must update (and freeze) the model at the identical points;
//! any divergence silently corrupts every subsequent symbol.

use log::debug;

use crate::compression::bits::BitSequence;
use crate::compression::{Compression, Result};
use crate::error::Error;

/// The total number of symbols: 256 bytes plus one EOF symbol.
pub const ALPHABET_SIZE: usize = 257;

/// Symbol index reserved for end-of-stream.
const EOF_SYMBOL: usize = 256;

// Fixed-point parameters for the range coder.
const CODE_VALUE_BITS: u32 = 16;
const MAX_CODE: u32 = (1 << CODE_VALUE_BITS) - 1; // 0xFFFF
const FIRST_QUARTER: u32 = (MAX_CODE + 1) / 4; // 0x4000
const HALF: u32 = 2 * FIRST_QUARTER; // 0x8000
const THIRD_QUARTER: u32 = 3 * FIRST_QUARTER; // 0xC000

/// Ceiling on the model's total count. Once the total reaches this value the
/// model freezes; a larger total would overflow the 32-bit range arithmetic.
const MAX_FREQUENCY: u32 = (1 << 14) - 1; // 16383

/// An adaptive order-0 frequency model over the 257-symbol alphabet.
///
/// Frequencies are stored as cumulative counts: `cum_freq[i]` is the number of
/// symbol-uses attributable to symbols below rank `i`, and
/// `cum_freq[ALPHABET_SIZE]` is the total. Every symbol starts with unit
/// weight (`cum_freq[i] = i`). Updating a symbol increments all counts above
/// its rank, an O(257) operation that is acceptable at this vocabulary size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptiveModel {
    cum_freq: [u32; ALPHABET_SIZE + 1],
    frozen: bool,
}

impl Default for AdaptiveModel {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveModel {
    /// Create a model with every symbol at equal unit frequency.
    pub fn new() -> Self {
        let mut cum_freq = [0u32; ALPHABET_SIZE + 1];
        for (i, count) in cum_freq.iter_mut().enumerate() {
            *count = i as u32;
        }
        AdaptiveModel {
            cum_freq,
            frozen: false,
        }
    }

    /// The total frequency count across all symbols.
    pub fn total(&self) -> u32 {
        self.cum_freq[ALPHABET_SIZE]
    }

    /// Record one use of `symbol`, unless the model is frozen.
    fn update(&mut self, symbol: usize) {
        if self.frozen {
            return;
        }
        for count in self.cum_freq[symbol + 1..].iter_mut() {
            *count += 1;
        }
        if self.cum_freq[ALPHABET_SIZE] >= MAX_FREQUENCY {
            self.frozen = true;
        }
    }

    /// Return `(lower, upper, total)` cumulative bounds for `symbol`, then
    /// record the use of that symbol.
    pub fn probability(&mut self, symbol: usize) -> (u32, u32, u32) {
        let lower = self.cum_freq[symbol];
        let upper = self.cum_freq[symbol + 1];
        let total = self.total();
        self.update(symbol);
        (lower, upper, total)
    }

    /// Find the symbol whose cumulative interval contains `scaled`, returning
    /// `(symbol, lower, upper, total)` and recording the use of that symbol.
    ///
    /// Fails with [`Error::MalformedData`] if no interval matches, which can
    /// only happen when encoder and decoder have fallen out of lock-step, i.e.
    /// the stream is corrupt.
    pub fn symbol_for(&mut self, scaled: u32) -> Result<(usize, u32, u32, u32)> {
        for symbol in 0..ALPHABET_SIZE {
            if scaled < self.cum_freq[symbol + 1] {
                let lower = self.cum_freq[symbol];
                let upper = self.cum_freq[symbol + 1];
                let total = self.total();
                self.update(symbol);
                return Ok((symbol, lower, upper, total));
            }
        }
        Err(Error::MalformedData(format!(
            "no symbol matches scaled value {scaled}"
        )))
    }
}

/// Append `bit` followed by `pending` bits of the opposite polarity.
///
/// The pending counter accumulates deferred decisions from E3 rescaling; once
/// the straddle resolves, the opposite-polarity bits are flushed in one run.
fn push_with_pending(bits: &mut BitSequence, bit: bool, pending: &mut u32) {
    bits.push(bit);
    for _ in 0..*pending {
        bits.push(!bit);
    }
    *pending = 0;
}

/// Encode `input` into a bit sequence, terminated by the EOF symbol.
fn encode(input: &[u8]) -> BitSequence {
    let mut bits = BitSequence::new();
    let mut model = AdaptiveModel::new();
    let mut low: u32 = 0;
    let mut high: u32 = MAX_CODE;
    let mut pending_bits: u32 = 0;

    let symbols = input
        .iter()
        .map(|&b| b as usize)
        .chain(std::iter::once(EOF_SYMBOL));

    for symbol in symbols {
        let (lower, upper, total) = model.probability(symbol);
        let range = high - low + 1;
        high = low + range * upper / total - 1;
        low += range * lower / total;

        loop {
            if high < HALF {
                push_with_pending(&mut bits, false, &mut pending_bits);
            } else if low >= HALF {
                push_with_pending(&mut bits, true, &mut pending_bits);
                low -= HALF;
                high -= HALF;
            } else if low >= FIRST_QUARTER && high < THIRD_QUARTER {
                // Underflow: low and high straddle the midpoint while
                // converging, so the next bit decision must be deferred.
                pending_bits += 1;
                low -= FIRST_QUARTER;
                high -= FIRST_QUARTER;
            } else {
                break;
            }
            low = (low << 1) & MAX_CODE;
            high = ((high << 1) | 1) & MAX_CODE;
        }
    }

    bits
}

/// Decode a bit sequence produced by [`encode`] back into bytes.
fn decode(mut bits: BitSequence) -> Result<Vec<u8>> {
    // Two synchronization bits stand in for the encoder's final interval
    // selection; once the sequence is exhausted, missing bits read as zero.
    bits.push(true);
    bits.push(false);
    let mut next_bit = || bits.pop_front().unwrap_or(false);

    let mut value: u32 = 0;
    for _ in 0..CODE_VALUE_BITS {
        value = (value << 1) | next_bit() as u32;
    }

    let mut model = AdaptiveModel::new();
    let mut low: u32 = 0;
    let mut high: u32 = MAX_CODE;
    let mut output = Vec::new();

    loop {
        let range = high - low + 1;
        let scaled = ((value - low + 1) * model.total() - 1) / range;
        let (symbol, lower, upper, total) = model.symbol_for(scaled)?;

        if symbol == EOF_SYMBOL {
            break;
        }
        output.push(symbol as u8);

        high = low + range * upper / total - 1;
        low += range * lower / total;

        loop {
            if high < HALF {
                // Decided bit was a zero; nothing to subtract.
            } else if low >= HALF {
                value -= HALF;
                low -= HALF;
                high -= HALF;
            } else if low >= FIRST_QUARTER && high < THIRD_QUARTER {
                value -= FIRST_QUARTER;
                low -= FIRST_QUARTER;
                high -= FIRST_QUARTER;
            } else {
                break;
            }
            low = (low << 1) & MAX_CODE;
            high = ((high << 1) | 1) & MAX_CODE;
            value = ((value << 1) | next_bit() as u32) & MAX_CODE;
        }
    }

    Ok(output)
}

/// Adaptive arithmetic codec.
///
/// # Example
///
/// ```
/// use squeeze::compression::{Compression, ArithmeticCoder};
///
/// let codec = ArithmeticCoder::new();
/// let compressed = codec.compress(b"hello arithmetic coding").unwrap();
/// let decompressed = codec.decompress(&compressed).unwrap();
/// assert_eq!(decompressed, b"hello arithmetic coding");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticCoder;

impl ArithmeticCoder {
    /// Create a new arithmetic codec.
    pub fn new() -> Self {
        ArithmeticCoder
    }
}

impl Compression for ArithmeticCoder {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let encoded = encode(data).pack().to_bytes()?;
        debug!(
            "arithmetic: compressed {} bytes to {} bytes",
            data.len(),
            encoded.len()
        );
        Ok(encoded)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let bits = BitSequence::from_bytes(data).unpack()?;
        decode(bits)
    }
}
