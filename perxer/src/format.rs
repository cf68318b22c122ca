//! Wire-format adapters
//!
//! The codecs work on raw bytes (PER) and XML text (XER). A format object
//! converts between what the caller holds and that internal form:
//! `to_internal` on the way in, `from_internal` on the way out. Pick one per
//! call site; the transcoder and the guess engine are generic over them.

use std::sync::LazyLock;

use perxer_core::{CodecError, CodecResult, Location};
use regex::Regex;

/// Whitespace-separated groups of hex digit pairs
static HEX_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[0-9A-Fa-f]{2})*(?:\s+(?:[0-9A-Fa-f]{2})+)*\s*$")
        .expect("Invalid regex pattern for hex text")
});

/// Converts a caller-side PER representation to and from raw bytes
pub trait PerFormat {
    type Wire: ?Sized + ToOwned;

    fn to_internal(&self, input: &Self::Wire) -> CodecResult<Vec<u8>>;

    fn from_internal(&self, bytes: &[u8]) -> <Self::Wire as ToOwned>::Owned;
}

/// Converts a caller-side XER representation to and from XML text
pub trait XerFormat {
    type Wire: ?Sized + ToOwned;

    fn to_internal(&self, input: &Self::Wire) -> CodecResult<String>;

    fn from_internal(&self, xml: String) -> <Self::Wire as ToOwned>::Owned;
}

/// PER as hex text
///
/// Input may be contiguous (`1940000000`) or split into byte groups by
/// whitespace (`19 40 00 00 00`), in either case. Output is contiguous
/// uppercase.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexPer;

impl PerFormat for HexPer {
    type Wire = str;

    fn to_internal(&self, input: &str) -> CodecResult<Vec<u8>> {
        if !HEX_TEXT.is_match(input) {
            return Err(CodecError::malformed(
                "expected hex digit pairs, optionally separated by whitespace",
                Location::Unknown,
            ));
        }
        let digits: String = input.split_whitespace().collect();
        hex::decode(&digits)
            .map_err(|e| CodecError::malformed(format!("invalid hex: {}", e), Location::Unknown))
    }

    fn from_internal(&self, bytes: &[u8]) -> String {
        hex::encode_upper(bytes)
    }
}

/// PER as raw bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPer;

impl PerFormat for RawPer {
    type Wire = [u8];

    fn to_internal(&self, input: &[u8]) -> CodecResult<Vec<u8>> {
        Ok(input.to_vec())
    }

    fn from_internal(&self, bytes: &[u8]) -> Vec<u8> {
        bytes.to_vec()
    }
}

/// XER as XML text
#[derive(Debug, Clone, Copy, Default)]
pub struct RawXer;

impl XerFormat for RawXer {
    type Wire = str;

    fn to_internal(&self, input: &str) -> CodecResult<String> {
        Ok(input.to_string())
    }

    fn from_internal(&self, xml: String) -> String {
        xml
    }
}
