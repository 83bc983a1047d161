//! Schema-driven records with a compact binary wire encoding
//!
//! # Overview
//!
//! `protium` is a small serialization engine in the style of proto2 message
//! handling. A schema is declared at startup as a set of [`MessageDescriptor`]s
//! and [`EnumDescriptor`]s, frozen into a [`Registry`], and shared read-only by
//! every [`Record`] built against it. Records hold field values keyed by tag,
//! track presence explicitly, and preserve any fields they do not recognize so
//! that newer writers and older readers can exchange data without loss.
//!
//! The engine is split along the same seams as the data it handles:
//!
//!   * [`schema`] declares message and enum types, and validates them when
//!     they are described and when the registry is built.
//!   * [`record`] is the dynamic, in-memory instance of a message type.
//!   * [`conv`] holds the encoder and decoder that move a `Record` to and
//!     from bytes, along with the [`Target`] sink abstraction used for output.
//!   * [`parse`] is the low-level, non-backtracking byte cursor the decoder
//!     reads through, with context windows for length-delimited payloads.
//!   * [`wire`] defines the wire kinds, field keys, and varint arithmetic.
//!   * [`store`] ties the above together for the common "load or start fresh,
//!     mutate, save back" cycle over files and in-memory buffers.
//!   * [`tutorial`] is the address-book schema used by the demo binary.
//!
//! # Wire format
//!
//! A serialized record is a bare concatenation of field units with no header
//! or trailer. Each unit is a varint key `(tag << 3) | wire_kind` followed by a
//! payload whose shape is determined by the wire kind: a base-128 varint, a
//! little-endian fixed 32- or 64-bit word, or a varint length followed by that
//! many raw bytes. Nested records are encoded as length-delimited payloads.
//!
//! # Example
//!
//! ```
//! use protium::{FieldDescriptor, MessageDescriptor, Record, Registry, Value, ValueKind};
//!
//! let registry = Registry::builder()
//!     .message(
//!         MessageDescriptor::describe(
//!             "Person",
//!             [
//!                 FieldDescriptor::required("name", 1, ValueKind::String),
//!                 FieldDescriptor::required("id", 2, ValueKind::Int32),
//!             ],
//!         )
//!         .unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut person = Record::new(&registry, "Person").unwrap();
//! person.set(1, Value::from("Ann")).unwrap();
//! person.set(2, Value::Int32(7)).unwrap();
//!
//! let bytes = person.encode().unwrap();
//! assert_eq!(bytes, vec![0x0a, 0x03, b'A', b'n', b'n', 0x10, 0x07]);
//!
//! let decoded = Record::decode(&registry, "Person", &bytes).unwrap();
//! assert_eq!(decoded, person);
//! ```

pub mod conv;
pub mod error;
mod internal;
pub mod parse;
pub mod record;
pub mod schema;
pub mod store;
pub mod tutorial;
pub mod value;
pub mod wire;

pub use crate::conv::{
    decode::DecodeOptions,
    error::{DecodeError, DecodeResult, EncodeError},
    target::{ByteCounter, Target},
};
pub use crate::error::{Error, RecordError, Result, SchemaError};
pub use crate::parse::{byteparser::ByteParser, error::ParseError, ParseResult, Parser};
pub use crate::record::{
    unknown::{UnknownField, UnknownFieldSet},
    Record,
};
pub use crate::schema::{
    enums::EnumDescriptor,
    field::{Cardinality, FieldDescriptor, ValueKind},
    message::MessageDescriptor,
    registry::{Registry, RegistryBuilder},
};
pub use crate::store::{ByteSink, ByteSource, FileStore, StoreError, WriteSink};
pub use crate::value::Value;
pub use crate::wire::WireKind;
