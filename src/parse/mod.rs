//! Custom parsing model with byte-level precision
//!
//! This module provides the primitive layer the decoder is built on: a
//! stateful cursor over an immutable byte buffer, with reads for each of the
//! wire payload shapes and *context windows* for bounding length-delimited
//! payloads.
//!
//! For schema-aware decoding of whole records, see
//! [`Record::decode`](crate::record::Record::decode).
//!
//! # Layout
//!
//!   * `error` defines [`ParseError`](error::ParseError) and its refinements.
//!   * `byteparser` defines [`ByteParser`](byteparser::ByteParser), the
//!     slice-backed implementation used by the decoder.

pub mod byteparser;
pub mod error;

pub use error::ParseResult;
use error::{ParseError, TokenError};

use crate::wire::MAX_VARINT_LEN;

/// # Parser
///
/// Abstraction over a stateful parse-object with reads for the primitive
/// wire payloads, queries on its internal state, and state-mutating
/// operations on *context windows*.
///
/// ## Model
///
///  * The parser is constructed over an immutable byte buffer.
///  * All parsing is non-backtracking and zero-lookahead; a byte is viewed
///    only by consuming it, and cannot be consumed twice.
///  * A context window may be opened over the next `n` bytes. While it is
///    open, no bytes beyond it can be consumed, and it can only be closed by
///    [`enforce_target`](Parser::enforce_target) once every byte within it has
///    been consumed.
///
/// ## Properties
///
/// * A fresh parser has `offset() == 0` and `view_len()` equal to the buffer length.
/// * `remainder()` is the largest `n` for which `consume(n)` succeeds.
/// * A failed `consume` leaves `remainder()` unchanged.
/// * Immediately after a successful `set_fit(n)`, `remainder() == n`.
pub trait Parser {
    /// Absolute offset of the end of the current view: the innermost window
    /// target, or the buffer length when no window is open.
    fn view_len(&self) -> usize;

    /// Absolute offset of the next unconsumed byte.
    fn offset(&self) -> usize;

    /// Number of bytes that can be consumed in the current context.
    fn remainder(&self) -> usize {
        self.view_len() - self.offset()
    }

    /// Consumes and returns a single byte.
    fn consume_byte(&mut self) -> ParseResult<u8>;

    /// Consumes and returns exactly `nbytes` bytes, or fails without
    /// consuming anything.
    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]>;

    /// Opens a context window of exactly `n` bytes from the current offset.
    fn set_fit(&mut self, n: usize) -> ParseResult<()>;

    /// Closes the innermost context window, failing if it is missing or has
    /// unconsumed bytes.
    fn enforce_target(&mut self) -> ParseResult<()>;

    /// Returns the already-consumed bytes from absolute offset `from` up to
    /// the current offset.
    ///
    /// Used to capture whole field units verbatim once they have been skipped.
    fn lookback(&self, from: usize) -> &[u8];

    /// Consumes `N` bytes and returns them in array-form
    fn consume_arr<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.consume(N)?);
        Ok(arr)
    }

    /// Consumes four bytes as a little-endian `u32`
    #[inline]
    fn take_fixed32(&mut self) -> ParseResult<u32> {
        self.consume_arr::<4>().map(u32::from_le_bytes)
    }

    /// Consumes eight bytes as a little-endian `u64`
    #[inline]
    fn take_fixed64(&mut self) -> ParseResult<u64> {
        self.consume_arr::<8>().map(u64::from_le_bytes)
    }

    /// Consumes a base-128 varint of at most ten bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::NonTerminating`] if the readable bytes run out
    /// before a byte without the continuation bit, and
    /// [`TokenError::VarintOverflow`] if the value would not fit in 64 bits.
    fn take_varint(&mut self) -> ParseResult<u64> {
        let mut acc: u64 = 0;
        let mut seen: Vec<u8> = Vec::new();
        for ix in 0..MAX_VARINT_LEN {
            let byte = match self.consume_byte() {
                Ok(byte) => byte,
                Err(_) => return Err(ParseError::from(TokenError::NonTerminating(seen))),
            };
            if ix == MAX_VARINT_LEN - 1 && byte > 0x01 {
                return Err(ParseError::from(TokenError::VarintOverflow));
            }
            acc |= u64::from(byte & 0x7f) << (7 * ix);
            if byte & 0x80 == 0 {
                return Ok(acc);
            }
            seen.push(byte);
        }
        Err(ParseError::from(TokenError::VarintOverflow))
    }

    /// Consumes a varint length prefix followed by that many bytes.
    fn take_length_delimited(&mut self) -> ParseResult<&[u8]> {
        let len = self.take_varint()?;
        self.consume(usize::try_from(len).unwrap_or(usize::MAX))
    }
}
