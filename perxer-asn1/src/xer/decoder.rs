//! XER decoder: XML text to [`AbstractValue`]

use crate::xer::node::XmlElement;
use perxer_core::{
    AbstractValue, BitString, CharacterSet, CodecError, CodecResult, Field, Location,
    SizeConstraint, TypeDef, TypeModel, ValueRange,
};

/// Decoder for XML encodings of a type model
#[derive(Debug, Clone, Copy)]
pub struct XerDecoder {
    max_depth: usize,
}

impl Default for XerDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl XerDecoder {
    pub fn new() -> Self {
        Self { max_depth: 64 }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decode a complete document whose root element is named after `ty`
    pub fn decode(&self, xml: &str, ty: &TypeModel) -> CodecResult<AbstractValue> {
        // Keyword elements such as `<accept/>` sit one level below their value.
        let root = XmlElement::parse(xml, self.max_depth.saturating_add(1))?;
        if root.name != ty.name() {
            return Err(CodecError::mismatch(
                format!("expected root element <{}>, found <{}>", ty.name(), root.name),
                Location::Path(root.name.clone()),
            ));
        }
        self.decode_element(&root, ty, ty.name(), 1)
    }

    fn decode_element(
        &self,
        element: &XmlElement,
        ty: &TypeModel,
        path: &str,
        depth: usize,
    ) -> CodecResult<AbstractValue> {
        let at = || Location::Path(path.to_string());
        if depth > self.max_depth {
            return Err(CodecError::unsupported(
                format!("nesting deeper than {} levels", self.max_depth),
                at(),
            ));
        }

        match ty.def() {
            TypeDef::Boolean => match self.keyword(element, path)?.as_str() {
                "true" => Ok(AbstractValue::Boolean(true)),
                "false" => Ok(AbstractValue::Boolean(false)),
                other => Err(CodecError::malformed(
                    format!("'{}' is not a BOOLEAN value", other),
                    at(),
                )),
            },
            TypeDef::Null => {
                if element.has_text() || !element.children.is_empty() {
                    return Err(CodecError::mismatch("NULL element must be empty", at()));
                }
                Ok(AbstractValue::Null)
            }
            TypeDef::Integer { range } => {
                let text = leaf_text(element, path)?;
                let value = parse_integer(text.trim(), path)?;
                check_range(value, range, path)?;
                Ok(AbstractValue::Integer(value))
            }
            TypeDef::Enumerated {
                root,
                extensions,
                extensible,
            } => {
                let id = self.keyword(element, path)?;
                if root.contains(&id) || (*extensible && extensions.contains(&id)) {
                    Ok(AbstractValue::Enumerated(id))
                } else {
                    Err(CodecError::mismatch(
                        format!("unknown identifier '{}' for {}", id, ty.name()),
                        at(),
                    ))
                }
            }
            TypeDef::BitString { size } => {
                let bits = hex_bits(leaf_text(element, path)?, size, path)?;
                check_size(bits.num_bits(), size, path)?;
                Ok(AbstractValue::BitString(bits))
            }
            TypeDef::OctetString { size } => {
                let digits: String = leaf_text(element, path)?
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                let bytes = hex::decode(&digits).map_err(|e| {
                    CodecError::malformed(format!("invalid hex text: {}", e), at())
                })?;
                check_size(bytes.len(), size, path)?;
                Ok(AbstractValue::OctetString(bytes))
            }
            TypeDef::CharacterString { charset, size } => {
                let text = leaf_text(element, path)?;
                check_characters(text, *charset, path)?;
                check_size(text.chars().count(), size, path)?;
                Ok(AbstractValue::CharacterString(text.to_string()))
            }
            TypeDef::Sequence { fields, .. } => {
                no_text(element, path)?;
                self.decode_sequence(element, fields, path, depth)
            }
            TypeDef::SequenceOf { element: item_ty, size } => {
                no_text(element, path)?;
                check_size(element.children.len(), size, path)?;
                let child_path = format!("{}/{}", path, item_ty.name());
                element
                    .children
                    .iter()
                    .map(|child| {
                        if child.name != item_ty.name() {
                            return Err(CodecError::mismatch(
                                format!("expected <{}>, found <{}>", item_ty.name(), child.name),
                                Location::Path(child_path.clone()),
                            ));
                        }
                        self.decode_element(child, item_ty, &child_path, depth + 1)
                    })
                    .collect::<CodecResult<Vec<_>>>()
                    .map(AbstractValue::SequenceOf)
            }
            TypeDef::Choice { alternatives, .. } => {
                no_text(element, path)?;
                let child = match element.children.as_slice() {
                    [child] => child,
                    [] => {
                        return Err(CodecError::mismatch(
                            format!("no alternative selected for {}", ty.name()),
                            at(),
                        ));
                    }
                    _ => {
                        return Err(CodecError::mismatch(
                            format!("more than one alternative for {}", ty.name()),
                            at(),
                        ));
                    }
                };
                let alternative = alternatives
                    .iter()
                    .find(|a| a.name() == child.name)
                    .ok_or_else(|| {
                        CodecError::mismatch(
                            format!("unknown alternative <{}> in {}", child.name, ty.name()),
                            at(),
                        )
                    })?;
                let child_path = format!("{}/{}", path, child.name);
                let value = self.decode_element(child, alternative.ty(), &child_path, depth + 1)?;
                Ok(AbstractValue::new_choice(alternative.name(), value))
            }
        }
    }

    fn decode_sequence(
        &self,
        element: &XmlElement,
        fields: &[Field],
        path: &str,
        depth: usize,
    ) -> CodecResult<AbstractValue> {
        let mut children = element.children.iter().peekable();
        let mut entries = Vec::new();
        for field in fields {
            match children.next_if(|child| child.name == field.name()) {
                Some(child) => {
                    let child_path = format!("{}/{}", path, field.name());
                    let value = self.decode_element(child, field.ty(), &child_path, depth + 1)?;
                    entries.push((field.name().to_string(), value));
                }
                None if field.may_be_absent() => {}
                None => {
                    let message = match children.peek() {
                        Some(child) => format!(
                            "expected <{}>, found <{}>",
                            field.name(),
                            child.name
                        ),
                        None => format!("missing element <{}>", field.name()),
                    };
                    return Err(CodecError::mismatch(message, Location::Path(path.to_string())));
                }
            }
        }
        if let Some(extra) = children.next() {
            return Err(CodecError::mismatch(
                format!("unexpected element <{}>", extra.name),
                Location::Path(path.to_string()),
            ));
        }
        Ok(AbstractValue::Sequence(entries))
    }

    /// Identifier given either as a single empty child element or as text
    fn keyword(&self, element: &XmlElement, path: &str) -> CodecResult<String> {
        match element.children.as_slice() {
            [] => Ok(element.text.trim().to_string()),
            [child] if child.children.is_empty() && !child.has_text() && !element.has_text() => {
                Ok(child.name.clone())
            }
            _ => Err(CodecError::mismatch(
                format!("<{}> must hold a single empty identifier element", element.name),
                Location::Path(path.to_string()),
            )),
        }
    }
}

fn leaf_text<'e>(element: &'e XmlElement, path: &str) -> CodecResult<&'e str> {
    if let Some(child) = element.children.first() {
        return Err(CodecError::mismatch(
            format!("unexpected element <{}> in a leaf value", child.name),
            Location::Path(path.to_string()),
        ));
    }
    Ok(&element.text)
}

fn no_text(element: &XmlElement, path: &str) -> CodecResult<()> {
    if element.has_text() {
        return Err(CodecError::mismatch(
            format!("unexpected text in <{}>", element.name),
            Location::Path(path.to_string()),
        ));
    }
    Ok(())
}

/// Hex digits of the padded octets. A fixed SIZE gives the bit count,
/// otherwise each digit carries four bits.
fn hex_bits(text: &str, size: &SizeConstraint, path: &str) -> CodecResult<BitString> {
    let at = || Location::Path(path.to_string());
    let mut digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let num_bits = match size.fixed_size().filter(|_| !size.extensible) {
        // whole padded octets, or just the nibbles that carry bits
        Some(n) if digits.len() == 2 * n.div_ceil(8) || digits.len() == n.div_ceil(4) => n,
        Some(n) => {
            return Err(CodecError::constraint(
                format!("{} hex digits do not hold exactly {} bits", digits.len(), n),
                at(),
            ));
        }
        None => digits.len() * 4,
    };
    if digits.len() % 2 == 1 {
        digits.push('0');
    }
    let bytes = hex::decode(&digits)
        .map_err(|e| CodecError::malformed(format!("invalid hex text: {}", e), at()))?;
    BitString::new(bytes, num_bits).map_err(|e| e.or_at(at()))
}

fn parse_integer(text: &str, path: &str) -> CodecResult<i64> {
    text.parse::<i64>().map_err(|_| {
        let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            CodecError::unsupported(
                format!("integer {} wider than 64 bits", text),
                Location::Path(path.to_string()),
            )
        } else {
            CodecError::malformed(
                format!("'{}' is not an INTEGER value", text),
                Location::Path(path.to_string()),
            )
        }
    })
}

fn check_range(value: i64, range: &ValueRange, path: &str) -> CodecResult<()> {
    if range.contains(value) || range.extensible {
        return Ok(());
    }
    Err(CodecError::constraint(
        format!("value {} outside {}", value, range),
        Location::Path(path.to_string()),
    ))
}

fn check_size(len: usize, size: &SizeConstraint, path: &str) -> CodecResult<()> {
    if size.contains(len) || size.extensible {
        return Ok(());
    }
    Err(CodecError::constraint(
        format!("length {} outside {}", len, size),
        Location::Path(path.to_string()),
    ))
}

fn check_characters(text: &str, charset: CharacterSet, path: &str) -> CodecResult<()> {
    match text.chars().find(|c| !charset.permits(*c)) {
        Some(c) => Err(CodecError::constraint(
            format!("character {:?} not permitted in {:?} string", c, charset),
            Location::Path(path.to_string()),
        )),
        None => Ok(()),
    }
}

/// Decode an XML document as a value of `ty`
pub fn decode(xml: &str, ty: &TypeModel) -> CodecResult<AbstractValue> {
    XerDecoder::new().decode(xml, ty)
}
