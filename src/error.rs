//! Unified error types for amf-serializer

use std::fmt;

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a serialization call
///
/// Every variant is fatal to the `serialize` call that produced it. No
/// partial output is returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The dispatcher (or class mapper) cannot map a value of this kind
    UnsupportedType(String),
    /// Nesting went past the configured ceiling
    DepthExceeded { max: usize },
    /// A value cannot be expressed within the wire format's limits
    EncodingConstraintViolation(String),
    /// The output buffer would grow past its configured limit
    AllocationFailure { requested: usize, limit: usize },
    /// Only AMF0 and AMF3 exist
    UnsupportedVersion(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedType(kind) => write!(f, "Unsupported type: {}", kind),
            Error::DepthExceeded { max } => {
                write!(f, "Nesting depth exceeded (max {})", max)
            }
            Error::EncodingConstraintViolation(msg) => {
                write!(f, "Encoding constraint violated: {}", msg)
            }
            Error::AllocationFailure { requested, limit } => write!(
                f,
                "Allocation failure: output of {} bytes exceeds limit of {}",
                requested, limit
            ),
            Error::UnsupportedVersion(v) => write!(f, "Unsupported AMF version: {}", v),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub(crate) fn constraint(msg: impl Into<String>) -> Self {
        Error::EncodingConstraintViolation(msg.into())
    }
}
