//! Value types produced and consumed by the codecs

pub mod bit_string;
pub mod conform;
pub mod value;

pub use bit_string::BitString;
pub use value::AbstractValue;
