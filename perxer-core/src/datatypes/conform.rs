//! Checking an [`AbstractValue`] against the [`TypeModel`] it claims to belong to

use crate::datatypes::value::AbstractValue;
use crate::error::{CodecError, CodecResult, Location};
use crate::model::{TypeDef, TypeModel};

impl AbstractValue {
    /// Verify that this value is a legal value of `ty`
    ///
    /// Errors carry the element path of the offending component. Kind
    /// mismatches, unknown or missing components and unknown identifiers are
    /// `StructuralMismatch`; out-of-range integers, sizes and characters are
    /// `ConstraintViolation`.
    pub fn conform(&self, ty: &TypeModel) -> CodecResult<()> {
        conform_at(self, ty, ty.name())
    }
}

fn conform_at(value: &AbstractValue, ty: &TypeModel, path: &str) -> CodecResult<()> {
    let at = || Location::Path(path.to_string());
    let size_error = |len: usize, size: &crate::model::SizeConstraint| {
        CodecError::constraint(format!("length {} outside {}", len, size), at())
    };

    match (ty.def(), value) {
        (TypeDef::Boolean, AbstractValue::Boolean(_)) | (TypeDef::Null, AbstractValue::Null) => {
            Ok(())
        }
        (TypeDef::Integer { range }, AbstractValue::Integer(v)) => {
            if range.contains(*v) || range.extensible {
                Ok(())
            } else {
                Err(CodecError::constraint(
                    format!("value {} outside {}", v, range),
                    at(),
                ))
            }
        }
        (
            TypeDef::Enumerated {
                root,
                extensions,
                extensible,
            },
            AbstractValue::Enumerated(id),
        ) => {
            if root.contains(id) || (*extensible && extensions.contains(id)) {
                Ok(())
            } else {
                Err(CodecError::mismatch(
                    format!("unknown identifier '{}' for {}", id, ty.name()),
                    at(),
                ))
            }
        }
        (TypeDef::BitString { size }, AbstractValue::BitString(bits)) => {
            if size.contains(bits.num_bits()) || size.extensible {
                Ok(())
            } else {
                Err(size_error(bits.num_bits(), size))
            }
        }
        (TypeDef::OctetString { size }, AbstractValue::OctetString(bytes)) => {
            if size.contains(bytes.len()) || size.extensible {
                Ok(())
            } else {
                Err(size_error(bytes.len(), size))
            }
        }
        (TypeDef::CharacterString { charset, size }, AbstractValue::CharacterString(text)) => {
            if let Some(c) = text.chars().find(|c| !charset.permits(*c)) {
                return Err(CodecError::constraint(
                    format!("character {:?} not permitted in {:?} string", c, charset),
                    at(),
                ));
            }
            let len = text.chars().count();
            if size.contains(len) || size.extensible {
                Ok(())
            } else {
                Err(size_error(len, size))
            }
        }
        (TypeDef::SequenceOf { element, size }, AbstractValue::SequenceOf(items)) => {
            if !size.contains(items.len()) && !size.extensible {
                return Err(size_error(items.len(), size));
            }
            let child = format!("{}/{}", path, element.name());
            items.iter().try_for_each(|item| conform_at(item, element, &child))
        }
        (TypeDef::Sequence { fields, .. }, AbstractValue::Sequence(present)) => {
            // Walk both lists in declaration order.
            let mut next = 0;
            for (name, component) in present {
                let offset = fields[next..]
                    .iter()
                    .position(|f| f.name() == name)
                    .ok_or_else(|| {
                        let message = if ty.field(name).is_some() {
                            format!("component '{}' duplicated or out of order", name)
                        } else {
                            format!("unknown component '{}' in {}", name, ty.name())
                        };
                        CodecError::mismatch(message, at())
                    })?;
                if let Some(skipped) = fields[next..next + offset]
                    .iter()
                    .find(|f| !f.may_be_absent())
                {
                    return Err(CodecError::mismatch(
                        format!("missing mandatory component '{}'", skipped.name()),
                        at(),
                    ));
                }
                let field = &fields[next + offset];
                conform_at(component, field.ty(), &format!("{}/{}", path, name))?;
                next += offset + 1;
            }
            match fields[next..].iter().find(|f| !f.may_be_absent()) {
                Some(missing) => Err(CodecError::mismatch(
                    format!("missing mandatory component '{}'", missing.name()),
                    at(),
                )),
                None => Ok(()),
            }
        }
        (TypeDef::Choice { alternatives, .. }, AbstractValue::Choice(name, inner)) => {
            let alternative = alternatives
                .iter()
                .find(|a| a.name() == name)
                .ok_or_else(|| {
                    CodecError::mismatch(
                        format!("unknown alternative '{}' in {}", name, ty.name()),
                        at(),
                    )
                })?;
            conform_at(inner, alternative.ty(), &format!("{}/{}", path, name))
        }
        (_, other) => Err(CodecError::mismatch(
            format!("{} value given for {} type {}", other.kind(), ty.kind(), ty.name()),
            at(),
        )),
    }
}
