//! PER and XER codecs for runtime ASN.1 type models
//!
//! Both codecs walk a [`TypeModel`](perxer_core::TypeModel) in lockstep with
//! their input and meet in the [`AbstractValue`](perxer_core::AbstractValue)
//! tree. Every operation is a pure function of its arguments: a failed call
//! returns an error and no partial output.

pub mod per;
pub mod xer;

pub use per::{PerDecodeReport, PerDecoder, PerEncoder, PerOptions, SkippedExtension};
pub use xer::{XerDecoder, XerEncoder, XerOptions};
