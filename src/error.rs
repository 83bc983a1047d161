//! General error types
//!
//! This module holds the errors raised while declaring a schema
//! ([`SchemaError`]) and while mutating records ([`RecordError`]), plus the
//! crate-wide [`Error`] that every more specific error converts into.
//! Errors tied to a single layer live beside it: [`ParseError`] in
//! [`parse`](crate::parse), [`DecodeError`] and [`EncodeError`] in
//! [`conv`](crate::conv), and [`StoreError`] in [`store`](crate::store).

use thiserror::Error;

use crate::conv::error::{DecodeError, EncodeError};
use crate::parse::error::ParseError;
use crate::schema::field::Cardinality;
use crate::store::StoreError;

/// Invalid schema construction.
///
/// Raised by [`MessageDescriptor::describe`], [`EnumDescriptor::describe`]
/// and [`RegistryBuilder::build`]; all of these run once at startup, so a
/// `SchemaError` is normally fatal to the program that declared the schema.
///
/// [`MessageDescriptor::describe`]: crate::schema::message::MessageDescriptor::describe
/// [`EnumDescriptor::describe`]: crate::schema::enums::EnumDescriptor::describe
/// [`RegistryBuilder::build`]: crate::schema::registry::RegistryBuilder::build
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("`{message}`: field `{field}` has non-positive tag {tag}")]
    NonPositiveTag {
        message: String,
        field: String,
        tag: u32,
    },
    #[error("`{message}`: field `{field}` has tag {tag}, above the maximum of {max}")]
    TagTooLarge {
        message: String,
        field: String,
        tag: u32,
        max: u32,
    },
    #[error("`{message}`: field `{field}` uses reserved tag {tag}")]
    ReservedTag {
        message: String,
        field: String,
        tag: u32,
    },
    #[error("`{message}`: tag {tag} is claimed by both `{first}` and `{second}`")]
    DuplicateTag {
        message: String,
        tag: u32,
        first: String,
        second: String,
    },
    #[error("`{message}`: field name `{field}` is declared more than once")]
    DuplicateFieldName { message: String, field: String },
    #[error("`{message}`: default for field `{field}` is {actual}, expected {expected}")]
    DefaultKindMismatch {
        message: String,
        field: String,
        expected: String,
        actual: String,
    },
    #[error("`{message}`: field `{field}` cannot carry a default ({reason})")]
    IllegalDefault {
        message: String,
        field: String,
        reason: &'static str,
    },
    #[error("`{message}`: field `{field}` cannot be packed ({reason})")]
    IllegalPacked {
        message: String,
        field: String,
        reason: &'static str,
    },
    #[error("enum `{name}`: {reason}")]
    InvalidEnum { name: String, reason: String },
    #[error("type name `{0}` is declared more than once")]
    DuplicateType(String),
    #[error("`{message}`: field `{field}` refers to undeclared {what} `{target}`")]
    UnresolvedReference {
        message: String,
        field: String,
        what: &'static str,
        target: String,
    },
}

/// Misuse of the record mutation and access API.
///
/// These are programming errors on the caller's side and are surfaced
/// immediately; the record is left exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("`{message}` has no field with tag {tag}")]
    UnknownField { message: String, tag: u32 },
    #[error("`{message}`.{field}: expected {expected}, got {actual}")]
    TypeMismatch {
        message: String,
        field: String,
        expected: String,
        actual: String,
    },
    #[error("`{message}`.{field} is {cardinality}; use `{hint}` instead")]
    Cardinality {
        message: String,
        field: String,
        cardinality: Cardinality,
        hint: &'static str,
    },
    #[error("index {index} is out of range for `{message}`.{field} with {len} elements")]
    IndexOutOfRange {
        message: String,
        field: String,
        index: usize,
        len: usize,
    },
    #[error("unknown message type `{0}`")]
    UnknownMessage(String),
    #[error("cannot merge a `{actual}` record into a `{expected}` record")]
    MessageMismatch { expected: String, actual: String },
}

/// Crate-wide error, for callers that do not care which layer failed.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    fn dummy<T: Send + Sync>() {}

    #[test]
    fn errors_threadsafe() {
        dummy::<SchemaError>();
        dummy::<RecordError>();
        dummy::<Error>();
    }

    #[test]
    fn display() {
        let err = RecordError::Cardinality {
            message: "Person".into(),
            field: "phones".into(),
            cardinality: Cardinality::Repeated,
            hint: "append",
        };
        assert_eq!(
            err.to_string(),
            "`Person`.phones is repeated; use `append` instead"
        );
    }
}
