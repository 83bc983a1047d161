use std::collections::BTreeSet;

use thiserror::Error;

use crate::parse::error::ParseError;
use crate::wire::WireKind;

/// Failure to decode a byte sequence into a record.
///
/// Decoding is all-or-nothing: whenever one of these is returned, the
/// record being built is discarded and no caller-visible record is touched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The input was truncated or lexically malformed at `offset`.
    #[error("malformed input at byte {offset}: {source}")]
    Parse {
        offset: usize,
        #[source]
        source: ParseError,
    },
    /// A field key carried a tag of zero or beyond the legal range.
    #[error("invalid tag {tag} at byte {offset}")]
    InvalidTag { offset: usize, tag: u64 },
    /// A field key carried a wire kind this engine does not handle.
    #[error("unsupported wire kind {raw} for tag {tag} at byte {offset}")]
    InvalidWireKind { offset: usize, tag: u64, raw: u8 },
    /// A declared field arrived under a wire kind incompatible with its value kind.
    #[error("field {tag} of `{message}` is declared {expected} but was encoded as {actual} (byte {offset})")]
    WireKindMismatch {
        message: String,
        tag: u32,
        expected: WireKind,
        actual: WireKind,
        offset: usize,
    },
    /// A `string` field held bytes that are not valid UTF-8.
    #[error("field {tag} of `{message}` is not valid UTF-8 (byte {offset})")]
    InvalidUtf8 {
        message: String,
        tag: u32,
        offset: usize,
    },
    /// Nested records were deeper than the configured limit.
    #[error("nested records exceed the recursion limit of {limit}")]
    RecursionLimit { limit: usize },
    /// The requested top-level message type is not in the registry.
    #[error("unknown message type `{0}`")]
    UnknownMessage(String),
    /// Required fields were absent and the caller asked for them to be checked.
    #[error("decoded `{message}` is missing required fields {paths:?}")]
    MissingRequired {
        message: String,
        paths: BTreeSet<String>,
    },
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Failure to encode a record.
///
/// Reported before any byte has been produced.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("`{message}` is missing required fields {paths:?}")]
    MissingRequired {
        message: String,
        paths: BTreeSet<String>,
    },
}

impl EncodeError {
    /// Paths of the required fields that were absent
    #[must_use]
    pub fn missing(&self) -> &BTreeSet<String> {
        match self {
            EncodeError::MissingRequired { paths, .. } => paths,
        }
    }
}
