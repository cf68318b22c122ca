//! Unaligned PER decoder
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use perxer_asn1::per::PerDecoder;
//! # fn demo(ty: &perxer_core::TypeModel) -> perxer_core::CodecResult<()> {
//! let value = PerDecoder::new(&[0x19, 0x40, 0x00, 0x00]).decode(ty)?;
//! # Ok(())
//! # }
//! ```

use crate::per::bits::BitReader;
use crate::per::types::{
    CONSTRAINED_LENGTH_LIMIT, CharEncoding, FRAGMENT_UNIT, MAX_FRAGMENT_BLOCKS, bits_for_range,
};
use perxer_core::{
    AbstractValue, BitString, CharacterSet, CodecError, CodecResult, Field, Location,
    SizeConstraint, TypeDef, TypeModel, ValueRange,
};

/// Decoder behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerOptions {
    /// Maximum type nesting depth
    pub max_depth: usize,
    /// Accept whole unread octets after the top-level value
    pub allow_trailing_octets: bool,
}

impl Default for PerOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            allow_trailing_octets: false,
        }
    }
}

/// An extension addition present in the input but unknown to the type model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedExtension {
    /// Element path of the enclosing SEQUENCE
    pub path: String,
    /// Position of the addition in the extension bitmap
    pub index: usize,
    /// Size of the skipped open type contents
    pub octets: usize,
}

/// Side information gathered while decoding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerDecodeReport {
    pub bits_consumed: usize,
    pub total_bits: usize,
    pub skipped_extensions: Vec<SkippedExtension>,
}

enum LengthPart {
    Complete(usize),
    Fragment(usize),
}

/// Unaligned PER decoder over one input buffer
pub struct PerDecoder<'a> {
    reader: BitReader<'a>,
    options: PerOptions,
    depth: usize,
    path: Vec<String>,
    skipped: Vec<SkippedExtension>,
}

impl<'a> PerDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: BitReader::new(data),
            options: PerOptions::default(),
            depth: 0,
            path: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: PerOptions) -> Self {
        self.options = options;
        self
    }

    /// Decode one complete value of `ty`
    pub fn decode(self, ty: &TypeModel) -> CodecResult<AbstractValue> {
        self.decode_with_report(ty).map(|(value, _)| value)
    }

    /// Decode one complete value of `ty` and report skipped extensions
    pub fn decode_with_report(
        mut self,
        ty: &TypeModel,
    ) -> CodecResult<(AbstractValue, PerDecodeReport)> {
        // A complete encoding is never shorter than one octet.
        if self.reader.is_empty() {
            return Err(CodecError::truncated(
                format!("empty input for {}", ty.name()),
                Location::Bit(0),
            ));
        }
        self.path.push(ty.name().to_string());
        let value = self.decode_value(ty)?;
        self.check_trailing(ty)?;
        let report = PerDecodeReport {
            bits_consumed: self.reader.consumed(),
            total_bits: self.reader.len(),
            skipped_extensions: self.skipped,
        };
        Ok((value, report))
    }

    fn check_trailing(&self, ty: &TypeModel) -> CodecResult<()> {
        if self.options.allow_trailing_octets {
            return Ok(());
        }
        // An empty encoding still occupies one octet.
        let used_octets = self.reader.consumed().div_ceil(8).max(1);
        let total_octets = self.reader.len() / 8;
        if total_octets > used_octets {
            return Err(CodecError::mismatch(
                format!(
                    "{} trailing octets after {} value",
                    total_octets - used_octets,
                    ty.name()
                ),
                Location::Bit(used_octets * 8),
            ));
        }
        Ok(())
    }

    fn decode_value(&mut self, ty: &TypeModel) -> CodecResult<AbstractValue> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(CodecError::unsupported(
                format!("nesting deeper than {} levels", self.options.max_depth),
                self.reader.location(),
            ));
        }
        let result = self.decode_def(ty);
        self.depth -= 1;
        result
    }

    fn decode_def(&mut self, ty: &TypeModel) -> CodecResult<AbstractValue> {
        match ty.def() {
            TypeDef::Boolean => Ok(AbstractValue::Boolean(self.reader.read_bit("BOOLEAN")?)),
            TypeDef::Null => Ok(AbstractValue::Null),
            TypeDef::Integer { range } => self.decode_integer(range, ty.name()).map(AbstractValue::Integer),
            TypeDef::Enumerated {
                root,
                extensions,
                extensible,
            } => self.decode_enumerated(ty.name(), root, extensions, *extensible),
            TypeDef::BitString { size } => {
                let mut bits = Vec::new();
                self.read_counted(size, ty.name(), |dec, n| {
                    bits.extend(dec.reader.read_bit_run(n, "BIT STRING contents")?);
                    Ok(())
                })?;
                Ok(AbstractValue::BitString(BitString::from_bits(bits)))
            }
            TypeDef::OctetString { size } => {
                let mut bytes = Vec::new();
                self.read_counted(size, ty.name(), |dec, n| {
                    bytes.extend(dec.reader.read_bytes(n, "OCTET STRING contents")?);
                    Ok(())
                })?;
                Ok(AbstractValue::OctetString(bytes))
            }
            TypeDef::CharacterString { charset, size } => {
                self.decode_character_string(ty.name(), *charset, size)
            }
            TypeDef::Sequence { fields, extensible } => {
                self.decode_sequence(ty.name(), fields, *extensible)
            }
            TypeDef::SequenceOf { element, size } => {
                let mut items = Vec::new();
                self.path.push(element.name().to_string());
                let counted = self.read_counted(size, ty.name(), |dec, n| {
                    for _ in 0..n {
                        items.push(dec.decode_value(element)?);
                    }
                    Ok(())
                });
                self.path.pop();
                counted?;
                Ok(AbstractValue::SequenceOf(items))
            }
            TypeDef::Choice {
                alternatives,
                extensible,
            } => self.decode_choice(ty.name(), alternatives, *extensible),
        }
    }

    fn decode_integer(&mut self, range: &ValueRange, name: &str) -> CodecResult<i64> {
        let start = self.reader.location();
        if range.extensible && self.reader.read_bit("INTEGER extension bit")? {
            return self.decode_unconstrained_whole_number(name);
        }
        match (range.min, range.max) {
            (Some(min), Some(max)) => {
                let span = (max as i128 - min as i128 + 1) as u128;
                let offset = self.reader.read_bits(bits_for_range(span), name)?;
                let value = min as i128 + offset as i128;
                if value > max as i128 {
                    return Err(CodecError::constraint(
                        format!("{} value {} outside {}", name, value, range),
                        start,
                    ));
                }
                Ok(value as i64)
            }
            (Some(min), None) => {
                let octets = self.read_whole_number_octets(name)?;
                if octets.len() > 16 {
                    return Err(CodecError::unsupported(
                        format!("{} integer wider than 64 bits", name),
                        start,
                    ));
                }
                let offset = octets.iter().fold(0u128, |acc, b| (acc << 8) | *b as u128);
                i128::try_from(offset)
                    .ok()
                    .and_then(|offset| (min as i128).checked_add(offset))
                    .and_then(|value| i64::try_from(value).ok())
                    .ok_or_else(|| {
                        CodecError::unsupported(
                            format!("{} integer wider than 64 bits", name),
                            start,
                        )
                    })
            }
            (None, _) => self.decode_unconstrained_whole_number(name),
        }
    }

    fn decode_unconstrained_whole_number(&mut self, name: &str) -> CodecResult<i64> {
        let start = self.reader.location();
        let octets = self.read_whole_number_octets(name)?;
        if octets.len() > 8 {
            return Err(CodecError::unsupported(
                format!("{} integer wider than 64 bits", name),
                start,
            ));
        }
        let negative = octets[0] & 0x80 != 0;
        let initial: i64 = if negative { -1 } else { 0 };
        Ok(octets.iter().fold(initial, |acc, b| (acc << 8) | *b as i64))
    }

    /// Length determinant plus contents octets of a whole number
    fn read_whole_number_octets(&mut self, name: &str) -> CodecResult<Vec<u8>> {
        let start = self.reader.location();
        let len = self.read_single_length(name)?;
        if len == 0 {
            return Err(CodecError::mismatch(
                format!("zero-length integer encoding for {}", name),
                start,
            ));
        }
        self.reader.read_bytes(len, name)
    }

    fn decode_enumerated(
        &mut self,
        name: &str,
        root: &[String],
        extensions: &[String],
        extensible: bool,
    ) -> CodecResult<AbstractValue> {
        let start = self.reader.location();
        if extensible && self.reader.read_bit("ENUMERATED extension bit")? {
            let index = self.read_normally_small_number(name)?;
            return extensions
                .get(index as usize)
                .map(|id| AbstractValue::Enumerated(id.clone()))
                .ok_or_else(|| {
                    CodecError::mismatch(
                        format!("unknown extension value {} of {}", index, name),
                        start,
                    )
                });
        }
        let index = self
            .reader
            .read_bits(bits_for_range(root.len() as u128), name)?;
        root.get(index as usize)
            .map(|id| AbstractValue::Enumerated(id.clone()))
            .ok_or_else(|| {
                CodecError::mismatch(
                    format!("enumeration index {} out of range for {}", index, name),
                    start,
                )
            })
    }

    fn decode_character_string(
        &mut self,
        name: &str,
        charset: CharacterSet,
        size: &SizeConstraint,
    ) -> CodecResult<AbstractValue> {
        let start = self.reader.location();
        let text = match CharEncoding::for_charset(charset) {
            CharEncoding::Octets => {
                let mut bytes = Vec::new();
                self.read_counted(&SizeConstraint::UNCONSTRAINED, name, |dec, n| {
                    bytes.extend(dec.reader.read_bytes(n, "UTF8String contents")?);
                    Ok(())
                })?;
                String::from_utf8(bytes).map_err(|e| {
                    CodecError::malformed(format!("{} is not valid UTF-8: {}", name, e), start.clone())
                })?
            }
            CharEncoding::Code { bits } => {
                let mut text = String::new();
                self.read_counted(size, name, |dec, n| {
                    for _ in 0..n {
                        let at = dec.reader.location();
                        let code = dec.reader.read_bits(bits, "character")?;
                        let c = char::from_u32(code as u32).filter(|c| charset.permits(*c));
                        match c {
                            Some(c) => text.push(c),
                            None => {
                                return Err(CodecError::constraint(
                                    format!("character code {} not permitted in {}", code, name),
                                    at,
                                ));
                            }
                        }
                    }
                    Ok(())
                })?;
                text
            }
            CharEncoding::Index { bits, alphabet } => {
                let mut text = String::new();
                self.read_counted(size, name, |dec, n| {
                    for _ in 0..n {
                        let at = dec.reader.location();
                        let index = dec.reader.read_bits(bits, "character")? as usize;
                        match alphabet.get(index) {
                            Some(b) => text.push(char::from(*b)),
                            None => {
                                return Err(CodecError::constraint(
                                    format!("character index {} outside alphabet of {}", index, name),
                                    at,
                                ));
                            }
                        }
                    }
                    Ok(())
                })?;
                text
            }
        };
        let len = text.chars().count();
        if !size.contains(len) && !size.extensible {
            return Err(CodecError::constraint(
                format!("{} length {} outside {}", name, len, size),
                start,
            ));
        }
        Ok(AbstractValue::CharacterString(text))
    }

    fn decode_sequence(
        &mut self,
        name: &str,
        fields: &[Field],
        extensible: bool,
    ) -> CodecResult<AbstractValue> {
        let extended = extensible && self.reader.read_bit("SEQUENCE extension bit")?;

        let root: Vec<usize> = (0..fields.len())
            .filter(|i| !fields[*i].is_extension_addition())
            .collect();
        let additions: Vec<usize> = (0..fields.len())
            .filter(|i| fields[*i].is_extension_addition())
            .collect();

        let mut present = Vec::with_capacity(root.len());
        for &i in &root {
            let field = &fields[i];
            present.push(!field.is_optional() || self.reader.read_bit("presence bitmap")?);
        }

        let mut values: Vec<Option<AbstractValue>> = vec![None; fields.len()];
        for (&i, &is_present) in root.iter().zip(&present) {
            if is_present {
                let field = &fields[i];
                self.path.push(field.name().to_string());
                let value = self.decode_value(field.ty());
                self.path.pop();
                values[i] = Some(value?);
            }
        }

        if extended {
            let count = self.read_normally_small_length(name)?;
            let bitmap = self.reader.read_bit_run(count, "extension presence bitmap")?;
            for (index, is_present) in bitmap.into_iter().enumerate() {
                if !is_present {
                    continue;
                }
                let (contents, base) = self.read_open_type(name)?;
                match additions.get(index) {
                    Some(&i) => {
                        let field = &fields[i];
                        self.path.push(field.name().to_string());
                        let value = self.decode_open_contents(&contents, base, field.ty());
                        self.path.pop();
                        values[i] = Some(value?);
                    }
                    None => {
                        let skipped = SkippedExtension {
                            path: self.path.join("/"),
                            index,
                            octets: contents.len(),
                        };
                        log::debug!(
                            "skipping unknown extension addition {} of {} ({} octets)",
                            index,
                            skipped.path,
                            skipped.octets
                        );
                        self.skipped.push(skipped);
                    }
                }
            }
        }

        Ok(AbstractValue::Sequence(
            fields
                .iter()
                .zip(values)
                .filter_map(|(field, value)| value.map(|v| (field.name().to_string(), v)))
                .collect(),
        ))
    }

    fn decode_choice(
        &mut self,
        name: &str,
        alternatives: &[Field],
        extensible: bool,
    ) -> CodecResult<AbstractValue> {
        let start = self.reader.location();
        if extensible && self.reader.read_bit("CHOICE extension bit")? {
            let index = self.read_normally_small_number(name)? as usize;
            let (contents, base) = self.read_open_type(name)?;
            let alternative = alternatives
                .iter()
                .filter(|a| a.is_extension_addition())
                .nth(index)
                .ok_or_else(|| {
                    CodecError::mismatch(
                        format!("unknown extension alternative {} of {}", index, name),
                        start.clone(),
                    )
                })?;
            self.path.push(alternative.name().to_string());
            let value = self.decode_open_contents(&contents, base, alternative.ty());
            self.path.pop();
            return Ok(AbstractValue::new_choice(alternative.name(), value?));
        }

        let root: Vec<&Field> = alternatives
            .iter()
            .filter(|a| !a.is_extension_addition())
            .collect();
        let index = self
            .reader
            .read_bits(bits_for_range(root.len() as u128), name)? as usize;
        let alternative = root.get(index).ok_or_else(|| {
            CodecError::mismatch(
                format!("choice index {} out of range for {}", index, name),
                start,
            )
        })?;
        self.path.push(alternative.name().to_string());
        let value = self.decode_value(alternative.ty());
        self.path.pop();
        Ok(AbstractValue::new_choice(alternative.name(), value?))
    }

    /// Decode a value from the octets of an open type
    fn decode_open_contents(
        &mut self,
        contents: &[u8],
        base: usize,
        ty: &TypeModel,
    ) -> CodecResult<AbstractValue> {
        let mut nested = PerDecoder {
            reader: BitReader::with_base(contents, base),
            options: self.options,
            depth: self.depth,
            path: self.path.clone(),
            skipped: Vec::new(),
        };
        let value = nested.decode_value(ty)?;
        self.skipped.append(&mut nested.skipped);
        Ok(value)
    }

    /// Read open type contents; returns the octets and the bit offset of the first one
    fn read_open_type(&mut self, name: &str) -> CodecResult<(Vec<u8>, usize)> {
        let mut contents = Vec::new();
        let mut base = None;
        self.read_counted(&SizeConstraint::UNCONSTRAINED, name, |dec, n| {
            base.get_or_insert(dec.reader.position());
            contents.extend(dec.reader.read_bytes(n, "open type contents")?);
            Ok(())
        })?;
        let base = base.unwrap_or_else(|| self.reader.position());
        Ok((contents, base))
    }

    /// Read a length (per `size`) and then that many units through `read_units`
    fn read_counted<F>(&mut self, size: &SizeConstraint, name: &str, mut read_units: F) -> CodecResult<usize>
    where
        F: FnMut(&mut Self, usize) -> CodecResult<()>,
    {
        let start = self.reader.location();
        let extended = size.extensible && self.reader.read_bit("size extension bit")?;

        if !extended {
            if let Some(max) = size.max.filter(|max| *max < CONSTRAINED_LENGTH_LIMIT) {
                let len = match size.fixed_size() {
                    Some(fixed) => fixed,
                    None => {
                        let span = (max.saturating_sub(size.min) + 1) as u128;
                        size.min + self.reader.read_bits(bits_for_range(span), name)? as usize
                    }
                };
                if !size.contains(len) {
                    return Err(CodecError::constraint(
                        format!("{} length {} outside {}", name, len, size),
                        start,
                    ));
                }
                read_units(self, len)?;
                return Ok(len);
            }
        }

        let mut total = 0usize;
        loop {
            match self.read_length(name)? {
                LengthPart::Fragment(n) => {
                    read_units(self, n)?;
                    total += n;
                }
                LengthPart::Complete(n) => {
                    read_units(self, n)?;
                    total += n;
                    break;
                }
            }
        }
        if !extended && !size.contains(total) {
            return Err(CodecError::constraint(
                format!("{} length {} outside {}", name, total, size),
                start,
            ));
        }
        Ok(total)
    }

    fn read_length(&mut self, name: &str) -> CodecResult<LengthPart> {
        let start = self.reader.location();
        let first = self.reader.read_bits(8, "length determinant")? as usize;
        if first & 0x80 == 0 {
            return Ok(LengthPart::Complete(first));
        }
        if first & 0xC0 == 0x80 {
            let second = self.reader.read_bits(8, "length determinant")? as usize;
            return Ok(LengthPart::Complete(((first & 0x3F) << 8) | second));
        }
        let blocks = first & 0x3F;
        if blocks == 0 || blocks > MAX_FRAGMENT_BLOCKS {
            return Err(CodecError::mismatch(
                format!("invalid fragment size {:#04x} in {}", first, name),
                start,
            ));
        }
        Ok(LengthPart::Fragment(blocks * FRAGMENT_UNIT))
    }

    /// Length determinant that may not be fragmented
    fn read_single_length(&mut self, name: &str) -> CodecResult<usize> {
        let start = self.reader.location();
        match self.read_length(name)? {
            LengthPart::Complete(n) => Ok(n),
            LengthPart::Fragment(_) => Err(CodecError::mismatch(
                format!("unexpected fragmented length in {}", name),
                start,
            )),
        }
    }

    fn read_normally_small_number(&mut self, name: &str) -> CodecResult<u64> {
        let start = self.reader.location();
        if !self.reader.read_bit("normally small number")? {
            return self.reader.read_bits(6, name);
        }
        let octets = self.read_whole_number_octets(name)?;
        if octets.len() > 8 {
            return Err(CodecError::unsupported(
                format!("index in {} wider than 64 bits", name),
                start,
            ));
        }
        Ok(octets.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64))
    }

    fn read_normally_small_length(&mut self, name: &str) -> CodecResult<usize> {
        if !self.reader.read_bit("normally small length")? {
            return Ok(self.reader.read_bits(6, name)? as usize + 1);
        }
        self.read_single_length(name)
    }
}

/// Decode a complete PER encoding of `ty` with default options
pub fn decode(data: &[u8], ty: &TypeModel) -> CodecResult<AbstractValue> {
    PerDecoder::new(data).decode(ty)
}

/// Decode with explicit options, also returning the decode report
pub fn decode_with_report(
    data: &[u8],
    ty: &TypeModel,
    options: PerOptions,
) -> CodecResult<(AbstractValue, PerDecodeReport)> {
    PerDecoder::new(data).with_options(options).decode_with_report(ty)
}
