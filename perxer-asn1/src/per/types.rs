//! PER constants and width computations

use perxer_core::CharacterSet;

/// Unit count of one length-determinant fragment block
pub const FRAGMENT_UNIT: usize = 16384;

/// Maximum number of blocks in a single fragment (`11000mmm`, m <= 4)
pub const MAX_FRAGMENT_BLOCKS: usize = 4;

/// A SIZE upper bound at or above this uses an unconstrained length determinant
pub const CONSTRAINED_LENGTH_LIMIT: usize = 65536;

/// Largest value encodable in the short (6 bit) form of a normally small number
pub const NORMALLY_SMALL_MAX: u64 = 63;

/// Alphabet of NumericString, in index order
pub const NUMERIC_ALPHABET: &[u8] = b" 0123456789";

/// Number of bits needed to encode any offset in a range of `range` values
///
/// A range of one value takes zero bits.
pub fn bits_for_range(range: u128) -> usize {
    if range <= 1 {
        0
    } else {
        128 - (range - 1).leading_zeros() as usize
    }
}

/// Minimal number of octets holding `value` as an unsigned number (at least one)
pub fn unsigned_octets(value: u128) -> usize {
    let bits = 128 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

/// Minimal number of octets holding `value` in two's complement (at least one)
pub fn signed_octets(value: i64) -> usize {
    let significant = if value < 0 {
        64 - value.leading_ones() as usize
    } else {
        64 - value.leading_zeros() as usize
    };
    // One extra bit for the sign.
    (significant + 1).div_ceil(8).max(1)
}

/// How the characters of a string type are carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharEncoding {
    /// Length counts octets of the UTF-8 encoding
    Octets,
    /// Each character is its code point in `bits` bits
    Code { bits: usize },
    /// Each character is its index in `alphabet`, in `bits` bits
    Index { bits: usize, alphabet: &'static [u8] },
}

impl CharEncoding {
    pub fn for_charset(charset: CharacterSet) -> Self {
        match charset {
            CharacterSet::Utf8 => CharEncoding::Octets,
            CharacterSet::Ia5 | CharacterSet::Visible | CharacterSet::Printable => {
                CharEncoding::Code { bits: 7 }
            }
            CharacterSet::Numeric => CharEncoding::Index {
                bits: bits_for_range(NUMERIC_ALPHABET.len() as u128),
                alphabet: NUMERIC_ALPHABET,
            },
        }
    }
}
