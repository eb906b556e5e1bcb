//! Error types for argument containers.
//!
//! Every fallible operation returns [`Result`]. Failed operations leave the
//! container they were called on unchanged.
//!
//! ## Error Categories
//!
//! - **Allocation**: a heap reservation failed while encoding or growing an array
//! - **Invalid formats**: unknown tags, misplaced or malformed `(N)` options, mixed data types
//! - **Invalid keys**: the operation names a key the container does not hold
//! - **Unsupported shapes**: growing a scalar, multi-dimensional arrays, 2-D container arrays
//! - **Incompatible formats**: a stored value cannot be read back with the requested format
//! - **Parameter errors**: the supplied values do not match the format string
//!
//! ## Examples
//!
//! ```rust
//! use dynargs::{Args, Error};
//!
//! let mut args = Args::new();
//! let err = args.push("size", "id", [1.into(), 2.0.into()]).unwrap_err();
//! assert!(matches!(err, Error::InvalidFormat { .. }));
//! assert_eq!(args.count(), 0);
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors of the argument container API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A heap reservation failed
    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// Malformed or heterogeneous format string
    #[error("Invalid format string \"{format}\": {msg}")]
    InvalidFormat { format: String, msg: String },

    /// The key does not exist in the container
    #[error("Invalid key: \"{0}\"")]
    InvalidKey(String),

    /// The operation does not support the stored value's shape
    #[error("Unsupported shape: {0}")]
    UnsupportedShape(String),

    /// The stored value cannot satisfy the requested format
    #[error("Incompatible format: stored \"{stored}\", requested \"{requested}\"")]
    IncompatibleFormat { stored: String, requested: String },

    /// A parameter does not match its format tag
    #[error("Parameter {position}: expected {expected}, found {found}")]
    ParamMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    /// The format string asks for more parameters than were supplied
    #[error("Parameter {position}: missing value, expected {expected}")]
    MissingParam { position: usize, expected: String },

    /// More parameters were supplied than the format string consumes
    #[error("{0} unused parameter(s) after the last format tag")]
    TrailingParams(usize),

    /// A byte buffer is too short or holds invalid data
    #[error("Buffer error at offset {offset}: {msg}")]
    Buffer { offset: usize, msg: String },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an invalid format error for the given format string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::Error;
    ///
    /// let err = Error::invalid_format("i(", "option is not terminated");
    /// assert!(err.to_string().contains("not terminated"));
    /// ```
    pub fn invalid_format(format: &str, msg: &str) -> Self {
        Error::InvalidFormat {
            format: format.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates an invalid key error.
    pub fn invalid_key(key: &str) -> Self {
        Error::InvalidKey(key.to_string())
    }

    /// Creates an unsupported shape error.
    pub fn unsupported_shape(msg: &str) -> Self {
        Error::UnsupportedShape(msg.to_string())
    }

    /// Creates an incompatible format error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::Error;
    ///
    /// let err = Error::incompatible("nI", "i");
    /// assert!(err.to_string().contains("requested \"i\""));
    /// ```
    pub fn incompatible(stored: &str, requested: &str) -> Self {
        Error::IncompatibleFormat {
            stored: stored.to_string(),
            requested: requested.to_string(),
        }
    }

    /// Creates a parameter mismatch error.
    pub fn param_mismatch(position: usize, expected: &str, found: &str) -> Self {
        Error::ParamMismatch {
            position,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a missing parameter error.
    pub fn missing_param(position: usize, expected: &str) -> Self {
        Error::MissingParam {
            position,
            expected: expected.to_string(),
        }
    }

    /// Creates a byte buffer error.
    pub fn buffer(offset: usize, msg: &str) -> Self {
        Error::Buffer {
            offset,
            msg: msg.to_string(),
        }
    }

    /// Creates an allocation error.
    pub fn allocation(msg: &str) -> Self {
        Error::Allocation(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dynargs::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        tracing::warn!(error = %err, "array allocation failed");
        Error::allocation(&err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
