//! Unaligned PER encoder
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use perxer_asn1::per::PerEncoder;
//! # fn demo(value: &perxer_core::AbstractValue, ty: &perxer_core::TypeModel) -> perxer_core::CodecResult<()> {
//! let bytes = PerEncoder::new().encode(value, ty)?;
//! # Ok(())
//! # }
//! ```

use crate::per::bits::BitWriter;
use crate::per::types::{
    CONSTRAINED_LENGTH_LIMIT, CharEncoding, FRAGMENT_UNIT, MAX_FRAGMENT_BLOCKS,
    NORMALLY_SMALL_MAX, bits_for_range, signed_octets, unsigned_octets,
};
use bytes::Bytes;
use perxer_core::{
    AbstractValue, CharacterSet, CodecError, CodecResult, Field, Location, SizeConstraint,
    TypeDef, TypeModel, ValueRange,
};
use std::ops::Range;

/// Unaligned PER encoder producing one complete encoding
///
/// The value is checked against the type model before any bits are written,
/// so a failed call never yields partial output.
pub struct PerEncoder {
    writer: BitWriter,
    max_depth: usize,
    depth: usize,
    path: Vec<String>,
}

impl Default for PerEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PerEncoder {
    pub fn new() -> Self {
        Self {
            writer: BitWriter::new(),
            max_depth: 64,
            depth: 0,
            path: Vec::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Encode `value` as a complete PER encoding of `ty`
    ///
    /// # Encoding Format
    ///
    /// The bits of the value followed by zero padding to an octet boundary. An
    /// encoding with no bits at all becomes a single zero octet.
    pub fn encode(mut self, value: &AbstractValue, ty: &TypeModel) -> CodecResult<Bytes> {
        value.conform(ty)?;
        self.path.push(ty.name().to_string());
        self.encode_value(value, ty)?;
        Ok(self.finish())
    }

    fn finish(self) -> Bytes {
        if self.writer.is_empty() {
            return Bytes::from_static(&[0]);
        }
        self.writer.into_bytes()
    }

    fn location(&self) -> Location {
        Location::Path(self.path.join("/"))
    }

    fn mismatch(&self, value: &AbstractValue, ty: &TypeModel) -> CodecError {
        CodecError::mismatch(
            format!("{} value given for {} type {}", value.kind(), ty.kind(), ty.name()),
            self.location(),
        )
    }

    fn encode_value(&mut self, value: &AbstractValue, ty: &TypeModel) -> CodecResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(CodecError::unsupported(
                format!("nesting deeper than {} levels", self.max_depth),
                self.location(),
            ));
        }
        let result = self.encode_def(value, ty);
        self.depth -= 1;
        result
    }

    fn encode_def(&mut self, value: &AbstractValue, ty: &TypeModel) -> CodecResult<()> {
        match (ty.def(), value) {
            (TypeDef::Boolean, AbstractValue::Boolean(b)) => {
                self.writer.write_bit(*b);
                Ok(())
            }
            (TypeDef::Null, AbstractValue::Null) => Ok(()),
            (TypeDef::Integer { range }, AbstractValue::Integer(v)) => {
                self.encode_integer(range, *v, ty.name())
            }
            (
                TypeDef::Enumerated {
                    root,
                    extensions,
                    extensible,
                },
                AbstractValue::Enumerated(id),
            ) => {
                if let Some(index) = root.iter().position(|r| r == id) {
                    if *extensible {
                        self.writer.write_bit(false);
                    }
                    self.writer
                        .write_bits(index as u64, bits_for_range(root.len() as u128));
                    return Ok(());
                }
                match extensions.iter().position(|e| e == id).filter(|_| *extensible) {
                    Some(index) => {
                        self.writer.write_bit(true);
                        self.write_normally_small_number(index as u64);
                        Ok(())
                    }
                    None => Err(CodecError::mismatch(
                        format!("unknown identifier '{}' for {}", id, ty.name()),
                        self.location(),
                    )),
                }
            }
            (TypeDef::BitString { size }, AbstractValue::BitString(bits)) => {
                self.write_counted(size, bits.num_bits(), ty.name(), |enc, range| {
                    enc.writer
                        .write_bit_run(bits.iter().skip(range.start).take(range.len()));
                    Ok(())
                })
            }
            (TypeDef::OctetString { size }, AbstractValue::OctetString(bytes)) => {
                self.write_counted(size, bytes.len(), ty.name(), |enc, range| {
                    enc.writer.write_bytes(&bytes[range]);
                    Ok(())
                })
            }
            (TypeDef::CharacterString { charset, size }, AbstractValue::CharacterString(text)) => {
                self.encode_character_string(text, *charset, size, ty.name())
            }
            (TypeDef::Sequence { fields, extensible }, AbstractValue::Sequence(entries)) => {
                self.encode_sequence(fields, *extensible, entries, ty.name())
            }
            (TypeDef::SequenceOf { element, size }, AbstractValue::SequenceOf(items)) => {
                self.path.push(element.name().to_string());
                let result = self.write_counted(size, items.len(), ty.name(), |enc, range| {
                    items[range]
                        .iter()
                        .try_for_each(|item| enc.encode_value(item, element))
                });
                self.path.pop();
                result
            }
            (
                TypeDef::Choice {
                    alternatives,
                    extensible,
                },
                AbstractValue::Choice(name, inner),
            ) => self.encode_choice(alternatives, *extensible, name, inner, ty.name()),
            _ => Err(self.mismatch(value, ty)),
        }
    }

    fn encode_integer(&mut self, range: &ValueRange, value: i64, name: &str) -> CodecResult<()> {
        let within = range.contains(value);
        if range.extensible {
            self.writer.write_bit(!within);
            if !within {
                self.write_unconstrained_whole_number(value);
                return Ok(());
            }
        } else if !within {
            return Err(CodecError::constraint(
                format!("{} value {} outside {}", name, value, range),
                self.location(),
            ));
        }

        match (range.min, range.max) {
            (Some(min), Some(max)) => {
                let span = (max as i128 - min as i128 + 1) as u128;
                let offset = (value as i128 - min as i128) as u64;
                self.writer.write_bits(offset, bits_for_range(span));
            }
            (Some(min), None) => {
                let offset = (value as i128 - min as i128) as u128;
                let octets = unsigned_octets(offset);
                self.write_length(octets);
                self.writer.write_bytes(&offset.to_be_bytes()[16 - octets..]);
            }
            (None, _) => self.write_unconstrained_whole_number(value),
        }
        Ok(())
    }

    fn write_unconstrained_whole_number(&mut self, value: i64) {
        let octets = signed_octets(value);
        self.write_length(octets);
        self.writer.write_bytes(&value.to_be_bytes()[8 - octets..]);
    }

    fn encode_character_string(
        &mut self,
        text: &str,
        charset: CharacterSet,
        size: &SizeConstraint,
        name: &str,
    ) -> CodecResult<()> {
        if let Some(c) = text.chars().find(|c| !charset.permits(*c)) {
            return Err(CodecError::constraint(
                format!("character {:?} not permitted in {}", c, name),
                self.location(),
            ));
        }
        match CharEncoding::for_charset(charset) {
            CharEncoding::Octets => {
                let bytes = text.as_bytes();
                self.write_counted(&SizeConstraint::UNCONSTRAINED, bytes.len(), name, |enc, range| {
                    enc.writer.write_bytes(&bytes[range]);
                    Ok(())
                })
            }
            CharEncoding::Code { bits } => {
                let chars: Vec<char> = text.chars().collect();
                self.write_counted(size, chars.len(), name, |enc, range| {
                    for c in &chars[range] {
                        enc.writer.write_bits(*c as u64, bits);
                    }
                    Ok(())
                })
            }
            CharEncoding::Index { bits, alphabet } => {
                let mut indices = Vec::with_capacity(text.len());
                for c in text.chars() {
                    match alphabet.iter().position(|a| char::from(*a) == c) {
                        Some(index) => indices.push(index as u64),
                        None => {
                            return Err(CodecError::constraint(
                                format!("character {:?} outside alphabet of {}", c, name),
                                self.location(),
                            ));
                        }
                    }
                }
                self.write_counted(size, indices.len(), name, |enc, range| {
                    for index in &indices[range] {
                        enc.writer.write_bits(*index, bits);
                    }
                    Ok(())
                })
            }
        }
    }

    fn encode_sequence(
        &mut self,
        fields: &[Field],
        extensible: bool,
        entries: &[(String, AbstractValue)],
        name: &str,
    ) -> CodecResult<()> {
        let lookup = |field: &Field| {
            entries
                .iter()
                .find(|(n, _)| n == field.name())
                .map(|(_, v)| v)
        };
        let root: Vec<&Field> = fields.iter().filter(|f| !f.is_extension_addition()).collect();
        let additions: Vec<&Field> = fields.iter().filter(|f| f.is_extension_addition()).collect();
        let any_addition = additions.iter().any(|f| lookup(*f).is_some());

        if extensible {
            self.writer.write_bit(any_addition);
        }
        for field in root.iter().filter(|f| f.is_optional()) {
            self.writer.write_bit(lookup(*field).is_some());
        }
        for field in &root {
            match lookup(*field) {
                Some(value) => {
                    self.path.push(field.name().to_string());
                    let result = self.encode_value(value, field.ty());
                    self.path.pop();
                    result?;
                }
                None if field.is_optional() => {}
                None => {
                    return Err(CodecError::mismatch(
                        format!("missing mandatory component '{}' of {}", field.name(), name),
                        self.location(),
                    ));
                }
            }
        }

        if any_addition {
            self.write_normally_small_length(additions.len());
            for field in &additions {
                self.writer.write_bit(lookup(*field).is_some());
            }
            for field in &additions {
                if let Some(value) = lookup(*field) {
                    self.path.push(field.name().to_string());
                    let result = self.write_open_type(value, field.ty(), name);
                    self.path.pop();
                    result?;
                }
            }
        }
        Ok(())
    }

    fn encode_choice(
        &mut self,
        alternatives: &[Field],
        extensible: bool,
        selected: &str,
        inner: &AbstractValue,
        name: &str,
    ) -> CodecResult<()> {
        let root: Vec<&Field> = alternatives
            .iter()
            .filter(|a| !a.is_extension_addition())
            .collect();
        self.path.push(selected.to_string());

        let result = if let Some(index) = root.iter().position(|a| a.name() == selected) {
            if extensible {
                self.writer.write_bit(false);
            }
            self.writer
                .write_bits(index as u64, bits_for_range(root.len() as u128));
            self.encode_value(inner, root[index].ty())
        } else if let Some((index, alternative)) = alternatives
            .iter()
            .filter(|a| a.is_extension_addition())
            .enumerate()
            .find(|(_, a)| a.name() == selected)
            .filter(|_| extensible)
        {
            self.writer.write_bit(true);
            self.write_normally_small_number(index as u64);
            self.write_open_type(inner, alternative.ty(), name)
        } else {
            Err(CodecError::mismatch(
                format!("unknown alternative '{}' in {}", selected, name),
                self.location(),
            ))
        };

        self.path.pop();
        result
    }

    /// Encode `value` on its own and append it as open type octets
    fn write_open_type(&mut self, value: &AbstractValue, ty: &TypeModel, name: &str) -> CodecResult<()> {
        let mut nested = PerEncoder {
            writer: BitWriter::new(),
            max_depth: self.max_depth,
            depth: self.depth,
            path: self.path.clone(),
        };
        nested.encode_value(value, ty)?;
        let contents = nested.finish();
        self.write_counted(&SizeConstraint::UNCONSTRAINED, contents.len(), name, |enc, range| {
            enc.writer.write_bytes(&contents[range]);
            Ok(())
        })
    }

    /// Write the length `len` (per `size`) and then the units through `write_units`
    fn write_counted<F>(
        &mut self,
        size: &SizeConstraint,
        len: usize,
        name: &str,
        mut write_units: F,
    ) -> CodecResult<()>
    where
        F: FnMut(&mut Self, Range<usize>) -> CodecResult<()>,
    {
        let within = size.contains(len);
        if size.extensible {
            self.writer.write_bit(!within);
        } else if !within {
            return Err(CodecError::constraint(
                format!("{} length {} outside {}", name, len, size),
                self.location(),
            ));
        }

        if within {
            if let Some(max) = size.max.filter(|max| *max < CONSTRAINED_LENGTH_LIMIT) {
                if size.fixed_size().is_none() {
                    let span = (max - size.min + 1) as u128;
                    self.writer
                        .write_bits((len - size.min) as u64, bits_for_range(span));
                }
                return write_units(self, 0..len);
            }
        }

        let mut offset = 0;
        loop {
            let remaining = len - offset;
            if remaining < FRAGMENT_UNIT {
                self.write_length(remaining);
                return write_units(self, offset..len);
            }
            let blocks = (remaining / FRAGMENT_UNIT).min(MAX_FRAGMENT_BLOCKS);
            self.writer.write_bits(0xC0 | blocks as u64, 8);
            let end = offset + blocks * FRAGMENT_UNIT;
            write_units(self, offset..end)?;
            offset = end;
        }
    }

    /// Unfragmented length determinant, `len` below 16384
    fn write_length(&mut self, len: usize) {
        if len < 128 {
            self.writer.write_bits(len as u64, 8);
        } else {
            self.writer.write_bits(0x8000 | len as u64, 16);
        }
    }

    fn write_normally_small_number(&mut self, value: u64) {
        if value <= NORMALLY_SMALL_MAX {
            self.writer.write_bit(false);
            self.writer.write_bits(value, 6);
        } else {
            self.writer.write_bit(true);
            let octets = unsigned_octets(value as u128);
            self.write_length(octets);
            self.writer.write_bytes(&value.to_be_bytes()[8 - octets..]);
        }
    }

    fn write_normally_small_length(&mut self, len: usize) {
        if (1..=64).contains(&len) {
            self.writer.write_bit(false);
            self.writer.write_bits(len as u64 - 1, 6);
        } else {
            self.writer.write_bit(true);
            self.write_length(len);
        }
    }
}

/// Encode `value` as a complete PER encoding of `ty`
pub fn encode(value: &AbstractValue, ty: &TypeModel) -> CodecResult<Bytes> {
    PerEncoder::new().encode(value, ty)
}
