//! Error types for KDL parsing and writing.
//!
//! Every error produced while reading a document carries the [`Location`] at which
//! parsing was abandoned. Once an error is returned the parse is over: the cursor
//! that produced it is invalidated and cannot be used again.
//!
//! ## Error Categories
//!
//! - **Lexical**: an invalid character where digits, an identifier start or a terminator was expected
//! - **Unterminated literal**: end of input inside a string, raw string, type annotation or block comment
//! - **Structural**: stray or missing braces, malformed `=`, missing space between tokens,
//!   misplaced type annotations
//! - **Numeric range**: a forced width cannot hold the literal, or a binary/octal literal is too large
//! - **Conversion**: a type converter rejected the literal text
//! - **Invalid cursor**: the cursor was used after being invalidated, or an illegal unread
//!
//! ## Examples
//!
//! ```rust
//! use kdl_doc::{parse, ErrorKind};
//!
//! let err = parse("node }").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Structural);
//! assert_eq!(err.location().map(|l| l.line), Some(1));
//! ```

use std::fmt;
use thiserror::Error;

/// A position in the source text.
///
/// `line` and `column` are 1-based; `offset` is the byte offset from the start of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Location {
    #[must_use]
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Location {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (byte {})",
            self.line, self.column, self.offset
        )
    }
}

/// The category of an [`Error`], independent of its message and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lexical,
    UnterminatedLiteral,
    Structural,
    NumericRange,
    Conversion,
    InvalidCursor,
    Io,
    Utf8,
    Custom,
}

/// Represents all possible errors that can occur while reading or writing KDL.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid character for the current grammar position
    #[error("Lexical error at {location}: {msg}")]
    Lexical { location: Location, msg: String },

    /// End of input inside a literal, annotation or comment
    #[error("Unterminated literal at {location}: {msg}")]
    UnterminatedLiteral { location: Location, msg: String },

    /// Braces, `=`, spacing or annotation placement are wrong
    #[error("Structural error at {location}: {msg}")]
    Structural { location: Location, msg: String },

    /// A number does not fit its forced or supported width
    #[error("Numeric range error at {location}: {msg}")]
    NumericRange { location: Location, msg: String },

    /// A type converter rejected its input
    #[error("Conversion error at {location}: {msg}")]
    Conversion { location: Location, msg: String },

    /// The cursor was misused or used after an error
    #[error("Invalid cursor use: {msg}")]
    InvalidCursor { msg: String },

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Input bytes are not valid UTF-8
    #[error("Invalid UTF-8: {0}")]
    Utf8(String),

    /// Custom error message
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates an error of the given kind at a location.
    ///
    /// Kinds that do not come from the source text ignore the location.
    pub fn at(kind: ErrorKind, location: Location, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match kind {
            ErrorKind::Lexical => Error::Lexical { location, msg },
            ErrorKind::UnterminatedLiteral => Error::UnterminatedLiteral { location, msg },
            ErrorKind::Structural => Error::Structural { location, msg },
            ErrorKind::NumericRange => Error::NumericRange { location, msg },
            ErrorKind::Conversion => Error::Conversion { location, msg },
            ErrorKind::InvalidCursor => Error::InvalidCursor { msg },
            ErrorKind::Io => Error::Io(msg),
            ErrorKind::Utf8 => Error::Utf8(msg),
            ErrorKind::Custom => Error::Custom(msg),
        }
    }

    /// Creates an invalid cursor error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_doc::{Error, ErrorKind};
    ///
    /// let err = Error::invalid_cursor("cursor overflow");
    /// assert_eq!(err.kind(), ErrorKind::InvalidCursor);
    /// assert!(err.location().is_none());
    /// ```
    pub fn invalid_cursor(msg: &str) -> Self {
        Error::InvalidCursor {
            msg: msg.to_string(),
        }
    }

    /// Creates a custom error with the given message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading or writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Lexical { .. } => ErrorKind::Lexical,
            Error::UnterminatedLiteral { .. } => ErrorKind::UnterminatedLiteral,
            Error::Structural { .. } => ErrorKind::Structural,
            Error::NumericRange { .. } => ErrorKind::NumericRange,
            Error::Conversion { .. } => ErrorKind::Conversion,
            Error::InvalidCursor { .. } => ErrorKind::InvalidCursor,
            Error::Io(_) => ErrorKind::Io,
            Error::Utf8(_) => ErrorKind::Utf8,
            Error::Custom(_) => ErrorKind::Custom,
        }
    }

    /// Returns where parsing was abandoned, if the error came from the source text.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Lexical { location, .. }
            | Error::UnterminatedLiteral { location, .. }
            | Error::Structural { location, .. }
            | Error::NumericRange { location, .. }
            | Error::Conversion { location, .. } => Some(*location),
            Error::InvalidCursor { .. } | Error::Io(_) | Error::Utf8(_) | Error::Custom(_) => {
                None
            }
        }
    }

    /// Returns the bare message, without position information.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Error::Lexical { msg, .. }
            | Error::UnterminatedLiteral { msg, .. }
            | Error::Structural { msg, .. }
            | Error::NumericRange { msg, .. }
            | Error::Conversion { msg, .. }
            | Error::InvalidCursor { msg } => msg,
            Error::Io(msg) | Error::Utf8(msg) | Error::Custom(msg) => msg,
        }
    }
}

/// Failure reported by a type converter.
///
/// Converters do not know where their literal came from, so the reader wraps this
/// into an [`Error::Conversion`] carrying the source location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConvertError(pub String);

impl ConvertError {
    pub fn new<T: fmt::Display>(msg: T) -> Self {
        ConvertError(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::Utf8(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
