//! Conversion between records and their wire encoding
//!
//! This module holds the two halves of the codec, both implemented as
//! inherent methods on [`Record`](crate::record::Record):
//!
//!   * [`encode`] walks a record in ascending tag order and writes each field
//!     unit into any [`Target`](target::Target). Required fields are checked
//!     before a single byte is produced, so a failed encode never leaves
//!     partial output behind.
//!   * [`decode`] reads field units through a [`Parser`](crate::parse::Parser),
//!     resolving nested message types through the record's registry and
//!     setting aside whatever the schema does not declare.
//!
//! The sub-module [`target`] offers an abstraction along the lines of
//! [`std::io::Write`], namely the [`target::Target`] trait. It is the dual of
//! [`crate::parse::Parser`], acting as the generic bound for serialization in
//! [`Record::write_to`](crate::record::Record::write_to).

pub mod decode;
pub mod encode;
pub mod error;
pub mod target;

pub use error::{DecodeResult, EncodeError};
