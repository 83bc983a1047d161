//! Error types used to report failure in low-level parsing
//!
//! This module defines [`ParseError`], returned by every fallible
//! [`Parser`](crate::parse::Parser) method, and its two refinements:
//! [`WindowError`] for violations of buffer or context-window bounds, and
//! [`TokenError`] for byte sequences that are lexically malformed.
//!
//! None of these carry schema context; the decoder wraps them in a
//! [`DecodeError`](crate::conv::error::DecodeError) together with the offset
//! at which the failing read began.

use thiserror::Error;

/// Enumeration over all errors that may be encountered when calling
/// methods on `Parser` types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Error class encountered when consuming bytes, or when opening,
    /// closing, or checking context windows.
    #[error(transparent)]
    Window(#[from] WindowError),
    /// Error class encountered when the bytes themselves cannot be
    /// interpreted, independent of any bounds.
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Type alias for Result with an error type of [`ParseError`]
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors related to buffer bounds and context windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WindowError {
    /// A consume operation would pass the end of the buffer or of the
    /// innermost context window.
    #[error("cannot consume {requested} bytes at offset {offset} (limit {limit})")]
    ConsumeWouldExceedLimit {
        offset: usize,
        requested: usize,
        limit: usize,
    },
    /// A context window would extend past the end of the buffer.
    #[error("cannot open {request}-byte context window: only {bytes_left} bytes remain")]
    OpenWouldExceedBuffer { bytes_left: usize, request: usize },
    /// A context window would extend past the innermost open window.
    #[error("cannot open {request}-byte context window: wider than the {limit} bytes left in the enclosing window")]
    OpenWouldExceedWindow { limit: usize, request: usize },
    /// The innermost window was closed with bytes left unconsumed.
    #[error("cannot close context window with {residual} residual bytes")]
    CloseWithResidue { residual: usize },
    #[error("no context window to close")]
    CloseWithoutWindow,
    /// The offset has passed the innermost window target. Reaching this is
    /// a bug in the parser implementation.
    #[error("BUG: offset exceeds the current limit by {excess} bytes")]
    OffsetOverflow { excess: usize },
}

/// Errors arising from malformed byte sequences
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// A varint ran into the end of the readable bytes before terminating.
    /// Holds the bytes consumed before the end was reached.
    #[error("varint failed to terminate before end of input (read {0:02x?})")]
    NonTerminating(Vec<u8>),
    /// A varint was longer than ten bytes, or its tenth byte carried bits
    /// past the 64th.
    #[error("varint does not fit in 64 bits")]
    VarintOverflow,
}

#[cfg(test)]
mod test {
    use super::*;

    fn dummy<T: Send + Sync>() {}

    #[test]
    fn parse_error_threadsafe() {
        dummy::<ParseError>()
    }

    #[test]
    fn display_passes_through() {
        let err = ParseError::from(WindowError::CloseWithResidue { residual: 3 });
        assert_eq!(err.to_string(), "cannot close context window with 3 residual bytes");
    }
}
