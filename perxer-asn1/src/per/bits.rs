//! MSB-first bit cursor and bit sink over octet buffers

use bitvec::prelude::*;
use bytes::Bytes;
use perxer_core::{CodecError, CodecResult, Location};

/// Read cursor over a PER buffer
///
/// `base` is the absolute bit offset of the first bit of `data`, so that
/// cursors over nested open types still report positions in the outer buffer.
pub struct BitReader<'a> {
    data: &'a BitSlice<u8, Msb0>,
    position: usize,
    base: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self {
            data: BitSlice::from_slice(data),
            position: 0,
            base,
        }
    }

    /// Absolute bit position
    pub fn position(&self) -> usize {
        self.base + self.position
    }

    /// Bits consumed from this buffer
    pub fn consumed(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub fn location(&self) -> Location {
        Location::Bit(self.position())
    }

    fn ensure(&self, needed: usize, what: &str) -> CodecResult<()> {
        if needed > self.remaining() {
            return Err(CodecError::truncated(
                format!(
                    "need {} bits for {}, {} available",
                    needed,
                    what,
                    self.remaining()
                ),
                self.location(),
            ));
        }
        Ok(())
    }

    pub fn read_bit(&mut self, what: &str) -> CodecResult<bool> {
        self.ensure(1, what)?;
        let bit = self.data[self.position];
        self.position += 1;
        Ok(bit)
    }

    /// Read up to 64 bits as an unsigned value (MSB first)
    pub fn read_bits(&mut self, num_bits: usize, what: &str) -> CodecResult<u64> {
        if num_bits == 0 {
            return Ok(0);
        }
        self.ensure(num_bits, what)?;
        let value = self.data[self.position..self.position + num_bits].load_be::<u64>();
        self.position += num_bits;
        Ok(value)
    }

    pub fn read_bytes(&mut self, num_bytes: usize, what: &str) -> CodecResult<Vec<u8>> {
        let num_bits = num_bytes.checked_mul(8).unwrap_or(usize::MAX);
        self.ensure(num_bits, what)?;
        let bytes = self.data[self.position..self.position + num_bits]
            .chunks(8)
            .map(|chunk| chunk.load_be::<u8>())
            .collect();
        self.position += num_bits;
        Ok(bytes)
    }

    /// Read a run of individual bits
    pub fn read_bit_run(&mut self, num_bits: usize, what: &str) -> CodecResult<Vec<bool>> {
        self.ensure(num_bits, what)?;
        let bits = self.data[self.position..self.position + num_bits]
            .iter()
            .by_vals()
            .collect();
        self.position += num_bits;
        Ok(bits)
    }
}

/// Growable bit sink
#[derive(Default)]
pub struct BitWriter {
    buffer: BitVec<u8, Msb0>,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.buffer.push(bit);
    }

    /// Write the low `num_bits` bits of `value` (MSB first, at most 64)
    pub fn write_bits(&mut self, value: u64, num_bits: usize) {
        for i in (0..num_bits).rev() {
            self.buffer.push((value >> i) & 1 == 1);
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_bitslice(bytes.view_bits::<Msb0>());
    }

    pub fn write_bit_run(&mut self, bits: impl IntoIterator<Item = bool>) {
        self.buffer.extend(bits);
    }

    /// Zero-pad to a whole octet and return the bytes
    pub fn into_bytes(mut self) -> Bytes {
        while self.buffer.len() % 8 != 0 {
            self.buffer.push(false);
        }
        Bytes::from(self.buffer.into_vec())
    }
}
