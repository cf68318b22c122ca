//! Codec settings
//!
//! One settings value covers both codecs. It can be built in code or loaded
//! from any serde format; missing keys take their defaults.

use perxer_asn1::{PerOptions, XerOptions};
use serde::{Deserialize, Serialize};

/// Default nesting limit for decoding and encoding
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecSettings {
    /// Pretty-print XER output with this indent width
    pub xer_indent: Option<usize>,
    /// Start XER output with an XML declaration
    pub xer_declaration: bool,
    /// Deepest type or element nesting accepted
    pub max_depth: usize,
    /// Accept whole unread octets after a PER value
    pub allow_trailing_octets: bool,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            xer_indent: None,
            xer_declaration: false,
            max_depth: DEFAULT_MAX_DEPTH,
            allow_trailing_octets: false,
        }
    }
}

impl CodecSettings {
    /// Compact XER, strict PER
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed XER with a declaration
    pub fn pretty(indent: usize) -> Self {
        Self {
            xer_indent: Some(indent),
            xer_declaration: true,
            ..Self::default()
        }
    }

    pub fn per_options(&self) -> PerOptions {
        PerOptions {
            max_depth: self.max_depth,
            allow_trailing_octets: self.allow_trailing_octets,
        }
    }

    pub fn xer_options(&self) -> XerOptions {
        XerOptions {
            indent: self.xer_indent,
            declaration: self.xer_declaration,
            max_depth: self.max_depth,
        }
    }
}
