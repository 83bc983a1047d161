//! Internal state-tracking for the slice-based `Parser`
//!
//! Nothing in here is part of the public API. The types are shaped around
//! the needs of [`ByteParser`](crate::parse::byteparser::ByteParser), which
//! keeps an absolute offset into an immutable buffer along with a stack of
//! context-window targets.

pub(crate) mod offset;
pub(crate) mod stack;
