//! Bit string value with an explicit bit length

use crate::error::{CodecError, CodecResult, Location};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arbitrary string of bits (zeros and ones). A bit string value can have any length including zero.
///
/// Bits are stored MSB first. Storage is always exactly `ceil(num_bits / 8)`
/// bytes with the unused low bits of the last byte cleared, so two values with
/// the same bits compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BitString {
    bytes: Vec<u8>,
    num_bits: usize,
}

impl BitString {
    /// Construct a new bit string object.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The bits packed MSB first
    /// * `num_bits` - The number of significant bits
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if `bytes` is too short to hold `num_bits` bits.
    /// Extra trailing bytes are dropped.
    pub fn new(mut bytes: Vec<u8>, num_bits: usize) -> CodecResult<Self> {
        let needed = num_bits.div_ceil(8);
        if bytes.len() < needed {
            return Err(CodecError::malformed(
                format!(
                    "bit string is too short to hold all bits. Need {} bytes for {} bits",
                    needed, num_bits
                ),
                Location::Unknown,
            ));
        }
        bytes.truncate(needed);
        let unused = needed * 8 - num_bits;
        if let Some(last) = bytes.last_mut() {
            *last &= 0xFFu8 << unused;
        }
        Ok(Self { bytes, num_bits })
    }

    /// Build from individual bits, first bit first
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut bytes = Vec::new();
        let mut num_bits = 0;
        for bit in bits {
            if num_bits % 8 == 0 {
                bytes.push(0);
            }
            if bit {
                if let Some(last) = bytes.last_mut() {
                    *last |= 0x80u8 >> (num_bits % 8);
                }
            }
            num_bits += 1;
        }
        Self { bytes, num_bits }
    }

    /// Get the bit string as byte array.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The number of bits in the byte array.
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }

    /// Get the bit at a specific position, `None` when out of range
    pub fn get_bit(&self, index: usize) -> Option<bool> {
        if index >= self.num_bits {
            return None;
        }
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8); // MSB first
        Some((self.bytes[byte_index] >> bit_index) & 1 == 1)
    }

    /// Iterate over the bits, first bit first
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.num_bits).map(move |i| (self.bytes[i / 8] >> (7 - i % 8)) & 1 == 1)
    }

    /// Render as `0`/`1` digits
    pub fn to_binary_string(&self) -> String {
        self.iter().map(|b| if b { '1' } else { '0' }).collect()
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'B", self.to_binary_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_string_new() {
        let bytes = vec![0xFF, 0x00, 0xAA];
        let bit_string = BitString::new(bytes.clone(), 24).unwrap();
        assert_eq!(bit_string.as_bytes(), &bytes);
        assert_eq!(bit_string.num_bits(), 24);
    }

    #[test]
    fn test_bit_string_invalid() {
        let result = BitString::new(vec![0xFF], 16);
        assert!(result.is_err());
    }

    #[test]
    fn test_unused_bits_are_cleared() {
        let a = BitString::new(vec![0xFF, 0xEE], 3).unwrap();
        let b = BitString::from_bits([true, true, true]);
        assert_eq!(a, b);
        assert_eq!(a.as_bytes(), &[0xE0]);
    }

    #[test]
    fn test_get_bit() {
        let bs = BitString::new(vec![0b1010_0000], 4).unwrap();
        assert_eq!(bs.get_bit(0), Some(true));
        assert_eq!(bs.get_bit(1), Some(false));
        assert_eq!(bs.get_bit(2), Some(true));
        assert_eq!(bs.get_bit(4), None);
    }

    #[test]
    fn test_binary_text() {
        let bs = BitString::from_bits([true, false, true, true, false]);
        assert_eq!(bs.num_bits(), 5);
        assert_eq!(bs.to_binary_string(), "10110");
        assert_eq!(bs.to_string(), "'10110'B");
        assert!(BitString::from_bits(std::iter::empty()).is_empty());
    }
}
