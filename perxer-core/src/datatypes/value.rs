//! In-memory value tree shared by the PER and XER codecs

use crate::datatypes::bit_string::BitString;
use crate::model::Kind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of an ASN.1 type, produced by decoding and consumed by encoding
///
/// A value only has meaning together with the [`TypeModel`](crate::TypeModel)
/// it was decoded against. Sequence components are kept in declaration order
/// and absent optional components are simply left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbstractValue {
    /// Boolean value
    Boolean(bool),
    /// Integer, bounded to 64 bits
    Integer(i64),
    /// Selected enumeration identifier
    Enumerated(String),
    /// Bit string with explicit length
    BitString(BitString),
    /// Octet string
    OctetString(Vec<u8>),
    /// Any restricted character string
    CharacterString(String),
    /// Null
    Null,
    /// Present components as `(name, value)` pairs
    Sequence(Vec<(String, AbstractValue)>),
    /// Elements of a SEQUENCE OF
    SequenceOf(Vec<AbstractValue>),
    /// Selected alternative name and its value
    Choice(String, Box<AbstractValue>),
}

impl AbstractValue {
    /// Kind of type this value can belong to
    pub fn kind(&self) -> Kind {
        match self {
            AbstractValue::Boolean(_) => Kind::Boolean,
            AbstractValue::Integer(_) => Kind::Integer,
            AbstractValue::Enumerated(_) => Kind::Enumerated,
            AbstractValue::BitString(_) => Kind::BitString,
            AbstractValue::OctetString(_) => Kind::OctetString,
            AbstractValue::CharacterString(_) => Kind::CharacterString,
            AbstractValue::Null => Kind::Null,
            AbstractValue::Sequence(_) => Kind::Sequence,
            AbstractValue::SequenceOf(_) => Kind::SequenceOf,
            AbstractValue::Choice(_, _) => Kind::Choice,
        }
    }

    pub fn new_enumerated(id: impl Into<String>) -> Self {
        AbstractValue::Enumerated(id.into())
    }

    pub fn new_choice(alternative: impl Into<String>, value: AbstractValue) -> Self {
        AbstractValue::Choice(alternative.into(), Box::new(value))
    }

    /// Build a sequence from `(name, value)` pairs
    pub fn new_sequence<S: Into<String>>(fields: impl IntoIterator<Item = (S, AbstractValue)>) -> Self {
        AbstractValue::Sequence(fields.into_iter().map(|(n, v)| (n.into(), v)).collect())
    }

    /// Look up a present component of a sequence
    pub fn field(&self, name: &str) -> Option<&AbstractValue> {
        match self {
            AbstractValue::Sequence(fields) => {
                fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Follow a slash separated path of component/alternative names.
    /// A numeric step indexes into a SEQUENCE OF.
    pub fn at_path(&self, path: &str) -> Option<&AbstractValue> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |value, step| match value {
                AbstractValue::Choice(name, inner) if name == step => Some(inner.as_ref()),
                AbstractValue::SequenceOf(items) => {
                    step.parse::<usize>().ok().and_then(|i| items.get(i))
                }
                _ => value.field(step),
            })
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AbstractValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_octet_string(&self) -> Option<&[u8]> {
        match self {
            AbstractValue::OctetString(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_enumerated(&self) -> Option<&str> {
        match self {
            AbstractValue::Enumerated(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for AbstractValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            AbstractValue::Integer(v) => write!(f, "{}", v),
            AbstractValue::Enumerated(id) => f.write_str(id),
            AbstractValue::BitString(bits) => write!(f, "{}", bits),
            AbstractValue::OctetString(bytes) => {
                f.write_str("'")?;
                for byte in bytes {
                    write!(f, "{:02X}", byte)?;
                }
                f.write_str("'H")
            }
            AbstractValue::CharacterString(text) => write!(f, "{:?}", text),
            AbstractValue::Null => f.write_str("NULL"),
            AbstractValue::Sequence(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {} {}", name, value)?;
                }
                f.write_str(" }")
            }
            AbstractValue::SequenceOf(items) => {
                f.write_str("{")?;
                for (i, value) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {}", value)?;
                }
                f.write_str(" }")
            }
            AbstractValue::Choice(name, value) => write!(f, "{} : {}", name, value),
        }
    }
}
