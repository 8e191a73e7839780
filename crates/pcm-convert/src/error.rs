//! Error handling for PCM conversion
//!
//! Conversion is pure and deterministic, so every error here is final: the
//! caller has to change its inputs before trying again.

#![allow(missing_docs)]

use std::fmt;
use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Error type for conversion operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// A required argument (input buffer or source format) was not supplied
    #[error("Missing required argument: {name}")]
    MissingArgument { name: &'static str },

    /// A format string contained a token outside the format vocabulary
    #[error("Cannot identify format token `{token}`")]
    UnrecognizedToken { token: String },

    /// A dtype name did not resolve to a known sample type
    #[error("Unsupported dtype: {name}")]
    UnsupportedDtype { name: String },

    /// Channel count of zero
    #[error("Invalid channel count: {channels} (must be at least 1)")]
    InvalidChannelCount { channels: u32 },

    /// A byte sub-region fell outside its backing buffer
    #[error("Byte region out of bounds: offset {offset} + length {length} exceeds {capacity} bytes")]
    RegionOutOfBounds {
        offset: usize,
        length: usize,
        capacity: usize,
    },
}

impl ConvertError {
    /// Create a new missing argument error
    pub fn missing_argument(name: &'static str) -> Self {
        Self::MissingArgument { name }
    }

    /// Create a new unrecognized token error
    pub fn unrecognized_token(token: impl Into<String>) -> Self {
        Self::UnrecognizedToken {
            token: token.into(),
        }
    }

    /// Create a new unsupported dtype error
    pub fn unsupported_dtype(name: impl Into<String>) -> Self {
        Self::UnsupportedDtype { name: name.into() }
    }

    /// Conversions are deterministic; retrying with the same inputs never helps
    pub fn is_recoverable(&self) -> bool {
        false
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingArgument { .. } | Self::RegionOutOfBounds { .. } => {
                ErrorCategory::Argument
            }
            Self::UnrecognizedToken { .. } | Self::InvalidChannelCount { .. } => {
                ErrorCategory::Format
            }
            Self::UnsupportedDtype { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or malformed call arguments
    Argument,
    /// Format descriptor and format string errors
    Format,
    /// Contract violations inside the library
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument => write!(f, "Argument"),
            Self::Format => write!(f, "Format"),
            Self::Internal => write!(f, "Internal"),
        }
    }
}
