//! Runtime description of an ASN.1 type
//!
//! A [`TypeModel`] is read-only schema data: the codecs walk it in lockstep with
//! their input. Sub-types are shared through `Arc`, so a model can be built once
//! and used from any number of threads.

use crate::error::{CodecError, CodecResult, Location};
use crate::model::constraint::{SizeConstraint, ValueRange};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// The ten ASN.1 kinds understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Boolean,
    Integer,
    Enumerated,
    BitString,
    OctetString,
    CharacterString,
    Null,
    Sequence,
    SequenceOf,
    Choice,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Boolean => "BOOLEAN",
            Kind::Integer => "INTEGER",
            Kind::Enumerated => "ENUMERATED",
            Kind::BitString => "BIT STRING",
            Kind::OctetString => "OCTET STRING",
            Kind::CharacterString => "character string",
            Kind::Null => "NULL",
            Kind::Sequence => "SEQUENCE",
            Kind::SequenceOf => "SEQUENCE OF",
            Kind::Choice => "CHOICE",
        };
        f.write_str(name)
    }
}

/// Restricted character string types
///
/// Determines the PER character width and the permitted alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterSet {
    /// UTF8String, encoded as octets
    Utf8,
    /// IA5String, 7 bits per character
    Ia5,
    /// VisibleString, 7 bits per character
    Visible,
    /// PrintableString, 7 bits per character
    Printable,
    /// NumericString, 4 bits per character
    Numeric,
}

impl CharacterSet {
    /// Whether a character belongs to the alphabet of this string type
    pub fn permits(&self, c: char) -> bool {
        match self {
            CharacterSet::Utf8 => true,
            CharacterSet::Ia5 => c.is_ascii(),
            CharacterSet::Visible => (' '..='~').contains(&c),
            CharacterSet::Printable => {
                c.is_ascii_alphanumeric() || " '()+,-./:=?".contains(c)
            }
            CharacterSet::Numeric => c == ' ' || c.is_ascii_digit(),
        }
    }
}

/// A named component of a SEQUENCE, or an alternative of a CHOICE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    #[serde(rename = "type")]
    ty: Arc<TypeModel>,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    extension_addition: bool,
}

impl Field {
    /// A mandatory component
    pub fn new(name: impl Into<String>, ty: impl Into<Arc<TypeModel>>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            optional: false,
            extension_addition: false,
        }
    }

    /// An OPTIONAL component
    pub fn optional(name: impl Into<String>, ty: impl Into<Arc<TypeModel>>) -> Self {
        Self {
            optional: true,
            ..Self::new(name, ty)
        }
    }

    /// Mark the component as declared after the extension marker
    pub fn extension_addition(mut self) -> Self {
        self.extension_addition = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeModel {
        &self.ty
    }

    pub fn shared_ty(&self) -> &Arc<TypeModel> {
        &self.ty
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_extension_addition(&self) -> bool {
        self.extension_addition
    }

    /// Whether a value may leave this component out
    ///
    /// Extension additions may always be absent: an encoder built against an
    /// older version of the type never produces them.
    pub fn may_be_absent(&self) -> bool {
        self.optional || self.extension_addition
    }
}

/// Per-kind definition of a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeDef {
    Boolean,
    Integer {
        #[serde(default)]
        range: ValueRange,
    },
    /// Identifiers are listed in ascending order of their associated numbers,
    /// which is the order PER uses for indices
    Enumerated {
        root: Vec<String>,
        #[serde(default)]
        extensions: Vec<String>,
        #[serde(default)]
        extensible: bool,
    },
    BitString {
        #[serde(default)]
        size: SizeConstraint,
    },
    OctetString {
        #[serde(default)]
        size: SizeConstraint,
    },
    CharacterString {
        charset: CharacterSet,
        #[serde(default)]
        size: SizeConstraint,
    },
    Null,
    Sequence {
        fields: Vec<Field>,
        #[serde(default)]
        extensible: bool,
    },
    SequenceOf {
        element: Arc<TypeModel>,
        #[serde(default)]
        size: SizeConstraint,
    },
    Choice {
        alternatives: Vec<Field>,
        #[serde(default)]
        extensible: bool,
    },
}

/// Constraints view used for diagnostics and by callers inspecting a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Constraints {
    pub range: Option<ValueRange>,
    pub size: Option<SizeConstraint>,
    pub extensible: bool,
}

/// Schema of one ASN.1 type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeModel {
    name: String,
    #[serde(flatten)]
    def: TypeDef,
}

impl TypeModel {
    pub fn new(name: impl Into<String>, def: TypeDef) -> Self {
        Self {
            name: name.into(),
            def,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, TypeDef::Boolean)
    }

    pub fn null(name: impl Into<String>) -> Self {
        Self::new(name, TypeDef::Null)
    }

    pub fn integer(name: impl Into<String>, range: ValueRange) -> Self {
        Self::new(name, TypeDef::Integer { range })
    }

    /// A non-extensible ENUMERATED
    pub fn enumerated(name: impl Into<String>, root: &[&str]) -> Self {
        Self::new(
            name,
            TypeDef::Enumerated {
                root: root.iter().map(|s| s.to_string()).collect(),
                extensions: Vec::new(),
                extensible: false,
            },
        )
    }

    /// An ENUMERATED with an extension marker and optional extension identifiers
    pub fn extensible_enumerated(
        name: impl Into<String>,
        root: &[&str],
        extensions: &[&str],
    ) -> Self {
        Self::new(
            name,
            TypeDef::Enumerated {
                root: root.iter().map(|s| s.to_string()).collect(),
                extensions: extensions.iter().map(|s| s.to_string()).collect(),
                extensible: true,
            },
        )
    }

    pub fn bit_string(name: impl Into<String>, size: SizeConstraint) -> Self {
        Self::new(name, TypeDef::BitString { size })
    }

    pub fn octet_string(name: impl Into<String>, size: SizeConstraint) -> Self {
        Self::new(name, TypeDef::OctetString { size })
    }

    pub fn character_string(
        name: impl Into<String>,
        charset: CharacterSet,
        size: SizeConstraint,
    ) -> Self {
        Self::new(name, TypeDef::CharacterString { charset, size })
    }

    pub fn sequence(name: impl Into<String>, fields: Vec<Field>, extensible: bool) -> Self {
        Self::new(name, TypeDef::Sequence { fields, extensible })
    }

    pub fn sequence_of(
        name: impl Into<String>,
        element: impl Into<Arc<TypeModel>>,
        size: SizeConstraint,
    ) -> Self {
        Self::new(
            name,
            TypeDef::SequenceOf {
                element: element.into(),
                size,
            },
        )
    }

    pub fn choice(name: impl Into<String>, alternatives: Vec<Field>, extensible: bool) -> Self {
        Self::new(
            name,
            TypeDef::Choice {
                alternatives,
                extensible,
            },
        )
    }

    /// Wrap in an `Arc` for sharing as a sub-type
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Same definition under a different name (e.g. `GroupID ::= TemporaryID`)
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            def: self.def.clone(),
        }
    }

    /// Human-readable identifier, also used as the XML element tag
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn def(&self) -> &TypeDef {
        &self.def
    }

    pub fn kind(&self) -> Kind {
        match &self.def {
            TypeDef::Boolean => Kind::Boolean,
            TypeDef::Integer { .. } => Kind::Integer,
            TypeDef::Enumerated { .. } => Kind::Enumerated,
            TypeDef::BitString { .. } => Kind::BitString,
            TypeDef::OctetString { .. } => Kind::OctetString,
            TypeDef::CharacterString { .. } => Kind::CharacterString,
            TypeDef::Null => Kind::Null,
            TypeDef::Sequence { .. } => Kind::Sequence,
            TypeDef::SequenceOf { .. } => Kind::SequenceOf,
            TypeDef::Choice { .. } => Kind::Choice,
        }
    }

    pub fn constraints(&self) -> Constraints {
        match &self.def {
            TypeDef::Integer { range } => Constraints {
                range: Some(*range),
                size: None,
                extensible: range.extensible,
            },
            TypeDef::BitString { size }
            | TypeDef::OctetString { size }
            | TypeDef::CharacterString { size, .. }
            | TypeDef::SequenceOf { size, .. } => Constraints {
                range: None,
                size: Some(*size),
                extensible: size.extensible,
            },
            TypeDef::Enumerated { extensible, .. }
            | TypeDef::Sequence { extensible, .. }
            | TypeDef::Choice { extensible, .. } => Constraints {
                extensible: *extensible,
                ..Constraints::default()
            },
            TypeDef::Boolean | TypeDef::Null => Constraints::default(),
        }
    }

    /// Components of a SEQUENCE or alternatives of a CHOICE, in declaration order
    pub fn fields(&self) -> &[Field] {
        match &self.def {
            TypeDef::Sequence { fields, .. } => fields,
            TypeDef::Choice { alternatives, .. } => alternatives,
            _ => &[],
        }
    }

    /// Look up a component or alternative by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name() == name)
    }

    /// Element type of a SEQUENCE OF
    pub fn element_type(&self) -> Option<&TypeModel> {
        match &self.def {
            TypeDef::SequenceOf { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Check that the model itself is well formed
    ///
    /// Codecs assume a validated model; a provider loading models from data
    /// files should call this once after loading.
    pub fn validate(&self) -> CodecResult<()> {
        self.validate_at(self.name.clone())
    }

    fn validate_at(&self, path: String) -> CodecResult<()> {
        let invalid = |message: String| CodecError::unsupported(message, Location::Path(path.clone()));
        match &self.def {
            TypeDef::Integer { range } if !range.is_well_formed() => {
                Err(invalid(format!("empty value range {}", range)))
            }
            TypeDef::Enumerated {
                root,
                extensions,
                extensible,
            } => {
                if root.is_empty() {
                    return Err(invalid("ENUMERATED without root identifiers".to_string()));
                }
                if !extensible && !extensions.is_empty() {
                    return Err(invalid(
                        "extension identifiers in a non-extensible ENUMERATED".to_string(),
                    ));
                }
                let mut seen = HashSet::new();
                for id in root.iter().chain(extensions) {
                    if !seen.insert(id.as_str()) {
                        return Err(invalid(format!("duplicate identifier '{}'", id)));
                    }
                }
                Ok(())
            }
            TypeDef::BitString { size }
            | TypeDef::OctetString { size }
            | TypeDef::CharacterString { size, .. }
                if !size.is_well_formed() =>
            {
                Err(invalid(format!("empty size constraint {}", size)))
            }
            TypeDef::SequenceOf { element, size } => {
                if !size.is_well_formed() {
                    return Err(invalid(format!("empty size constraint {}", size)));
                }
                element.validate_at(format!("{}/{}", path, element.name()))
            }
            TypeDef::Sequence { fields, extensible } | TypeDef::Choice {
                alternatives: fields,
                extensible,
            } => {
                if self.kind() == Kind::Choice
                    && !fields.iter().any(|f| !f.is_extension_addition())
                {
                    return Err(invalid("CHOICE without root alternatives".to_string()));
                }
                let mut seen = HashSet::new();
                for field in fields {
                    if !seen.insert(field.name()) {
                        return Err(invalid(format!("duplicate component '{}'", field.name())));
                    }
                    if field.is_extension_addition() && !extensible {
                        return Err(invalid(format!(
                            "extension addition '{}' in a non-extensible type",
                            field.name()
                        )));
                    }
                    field.ty().validate_at(format!("{}/{}", path, field.name()))?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
