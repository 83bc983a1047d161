//! Schema declaration
//!
//! A schema is a set of message and enum types, declared once at startup and
//! read-only afterwards:
//!
//!   * [`field`] describes a single field: tag, name, cardinality, value kind,
//!     and default.
//!   * [`message`] groups fields into a message type and validates them as a set.
//!   * [`enums`] declares enum types as named integer values.
//!   * [`registry`] collects the types, checks that every cross-reference
//!     resolves, and freezes them behind an `Arc` for sharing.

pub mod enums;
pub mod field;
pub mod message;
pub mod registry;
