//! perxer - PER <-> XER transcoding for SEMI connected-vehicle messages
//!
//! Converts messages between the unaligned Packed Encoding Rules (PER) and the
//! XML Encoding Rules (XER), driven by runtime type models, and guesses the
//! message type of unlabeled input.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `perxer-core`: error type, type models, abstract values
//! - `perxer-asn1`: PER and XER codecs
//! - `perxer-semi`: SEMI message type models
//! - `perxer`: transcoder, type guessing, wire formats, settings
//!
//! # Usage
//!
//! ```
//! use perxer::format::{HexPer, RawXer};
//! use perxer::{CodecSettings, guess_per_to_xer_with, semi};
//!
//! let result = guess_per_to_xer_with(
//!     &semi::all_types(),
//!     "19 40 00 00 00 38 15 38 86 c0",
//!     &HexPer,
//!     &RawXer,
//!     &CodecSettings::default(),
//! );
//! assert_eq!(result.matched_type().unwrap().name(), "DataAcceptance");
//! ```

pub mod format;
pub mod guess;
pub mod settings;
pub mod transcoder;

// Re-export core types
pub use perxer_core::{AbstractValue, BitString, CodecError, CodecResult, ErrorKind, Location};
pub use perxer_core::{Field, TypeModel};

pub use format::{HexPer, PerFormat, RawPer, RawXer, XerFormat};
pub use guess::{
    CandidateFailure, Direction, GuessResult, TypeGuessEngine, guess_per_to_xer,
    guess_per_to_xer_with, guess_xer_to_per, guess_xer_to_per_with,
};
pub use settings::CodecSettings;
pub use transcoder::{Transcoder, per_to_xer, per_to_xer_with, xer_to_per, xer_to_per_with};

// Re-export codec API
pub mod codec {
    pub use perxer_asn1::*;
}

// Re-export message models
pub mod semi {
    pub use perxer_semi::*;
}
