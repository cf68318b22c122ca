//! Unaligned PER (Packed Encoding Rules) codec driven by a runtime type model
//!
//! This module implements the unaligned variant of ITU-T X.691. Values are
//! packed MSB first with no octet alignment between fields; the complete
//! encoding is zero-padded to a whole octet.
//!
//! # Encoding Overview
//!
//! ## Sequences
//!
//! ```text
//! [ext bit]? [presence bitmap: one bit per OPTIONAL root component] [root components]
//! [n-1 as normally small length] [n extension presence bits] [open type per present addition]
//! ```
//!
//! The extension part only follows when the extension bit is set.
//!
//! ## Whole numbers
//!
//! - **Constrained** `(lb..ub)`: `value - lb` in exactly `ceil(log2(ub - lb + 1))` bits
//! - **Semi-constrained** `(lb..MAX)`: length determinant, then `value - lb` as the
//!   minimal number of unsigned octets
//! - **Unconstrained**: length determinant, then minimal two's-complement octets
//!
//! ## Length determinants
//!
//! ```text
//! 0xxxxxxx                   n < 128
//! 10xxxxxx xxxxxxxx          n < 16384
//! 11000mmm                   m * 16384 units follow (m in 1..=4), then another determinant
//! ```
//!
//! A length whose upper bound is below 65536 is instead encoded as a constrained
//! whole number over the SIZE range, taking zero bits for fixed sizes.
//!
//! ## Open types
//!
//! Extension additions and extension alternatives are wrapped in an octet
//! length determinant; a decoder that does not know the addition skips its
//! octets.

pub mod bits;
pub mod decoder;
pub mod encoder;
pub mod types;

pub use decoder::{PerDecodeReport, PerDecoder, PerOptions, SkippedExtension, decode, decode_with_report};
pub use encoder::{PerEncoder, encode};
