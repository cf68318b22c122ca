use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Where in the input (or in the value tree) an error was detected
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// Bit offset into a PER buffer, counted from the first bit of the first octet
    Bit(usize),
    /// Slash separated element path, rooted at the top-level type name
    Path(String),
    /// Position not known (e.g. input normalization before any decoding started)
    Unknown,
}

impl Location {
    /// Byte offset for PER locations
    pub fn byte_offset(&self) -> Option<usize> {
        match self {
            Location::Bit(bit) => Some(bit / 8),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Bit(bit) => write!(f, "bit {} (byte {})", bit, bit / 8),
            Location::Path(path) => write!(f, "/{}", path),
            Location::Unknown => write!(f, "unknown position"),
        }
    }
}

/// Category of a codec failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    MalformedInput,
    TruncatedInput,
    StructuralMismatch,
    ConstraintViolation,
    UnsupportedType,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedInput => "malformed input",
            ErrorKind::TruncatedInput => "truncated input",
            ErrorKind::StructuralMismatch => "structural mismatch",
            ErrorKind::ConstraintViolation => "constraint violation",
            ErrorKind::UnsupportedType => "unsupported type",
        };
        f.write_str(name)
    }
}

/// Main error type for PER/XER codec operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input cannot even be tokenized as bytes or XML
    #[error("Malformed input at {location}: {message}")]
    MalformedInput { message: String, location: Location },

    /// Ran out of bits or elements before a field completed
    #[error("Truncated input at {location}: {message}")]
    TruncatedInput { message: String, location: Location },

    /// Unknown choice tag, missing required field, unexpected element name
    #[error("Structural mismatch at {location}: {message}")]
    StructuralMismatch { message: String, location: Location },

    /// Integer or length outside its declared bounds
    #[error("Constraint violation at {location}: {message}")]
    ConstraintViolation { message: String, location: Location },

    /// The type model uses a construct the engine does not implement
    #[error("Unsupported type at {location}: {message}")]
    UnsupportedType { message: String, location: Location },
}

impl CodecError {
    pub fn malformed(message: impl Into<String>, location: Location) -> Self {
        CodecError::MalformedInput {
            message: message.into(),
            location,
        }
    }

    pub fn truncated(message: impl Into<String>, location: Location) -> Self {
        CodecError::TruncatedInput {
            message: message.into(),
            location,
        }
    }

    pub fn mismatch(message: impl Into<String>, location: Location) -> Self {
        CodecError::StructuralMismatch {
            message: message.into(),
            location,
        }
    }

    pub fn constraint(message: impl Into<String>, location: Location) -> Self {
        CodecError::ConstraintViolation {
            message: message.into(),
            location,
        }
    }

    pub fn unsupported(message: impl Into<String>, location: Location) -> Self {
        CodecError::UnsupportedType {
            message: message.into(),
            location,
        }
    }

    /// Get the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::MalformedInput { .. } => ErrorKind::MalformedInput,
            CodecError::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            CodecError::StructuralMismatch { .. } => ErrorKind::StructuralMismatch,
            CodecError::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            CodecError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
        }
    }

    /// Get the human-readable message
    pub fn message(&self) -> &str {
        match self {
            CodecError::MalformedInput { message, .. }
            | CodecError::TruncatedInput { message, .. }
            | CodecError::StructuralMismatch { message, .. }
            | CodecError::ConstraintViolation { message, .. }
            | CodecError::UnsupportedType { message, .. } => message,
        }
    }

    /// Get the position where the error was detected
    pub fn location(&self) -> &Location {
        match self {
            CodecError::MalformedInput { location, .. }
            | CodecError::TruncatedInput { location, .. }
            | CodecError::StructuralMismatch { location, .. }
            | CodecError::ConstraintViolation { location, .. }
            | CodecError::UnsupportedType { location, .. } => location,
        }
    }

    /// Fill in the location if none was recorded yet
    pub fn or_at(mut self, at: Location) -> Self {
        let slot = match &mut self {
            CodecError::MalformedInput { location, .. }
            | CodecError::TruncatedInput { location, .. }
            | CodecError::StructuralMismatch { location, .. }
            | CodecError::ConstraintViolation { location, .. }
            | CodecError::UnsupportedType { location, .. } => location,
        };
        if *slot == Location::Unknown {
            *slot = at;
        }
        self
    }
}

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
