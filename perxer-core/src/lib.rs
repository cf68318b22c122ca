//! Core types for PER/XER transcoding
//!
//! This crate provides the error type, the type model describing ASN.1 types,
//! and the abstract value tree shared by the PER and XER codecs.

pub mod datatypes;
pub mod error;
pub mod model;

pub use datatypes::{AbstractValue, BitString};
pub use error::{CodecError, CodecResult, ErrorKind, Location};
pub use model::{CharacterSet, Field, Kind, SizeConstraint, TypeDef, TypeModel, ValueRange};
