//! Type models: the read-only schema the codecs walk

pub mod constraint;
pub mod type_model;

pub use constraint::{SizeConstraint, ValueRange};
pub use type_model::{CharacterSet, Constraints, Field, Kind, TypeDef, TypeModel};
