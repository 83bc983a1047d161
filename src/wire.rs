//! Wire-level primitives
//!
//! This module contains the handful of definitions that every other layer
//! agrees on: the set of wire kinds, how a tag and wire kind are packed into a
//! field key, and the base-128 varint arithmetic used for keys, lengths, and
//! integral payloads.
//!
//! # Varints
//!
//! A varint stores an unsigned 64-bit magnitude seven bits at a time, least
//! significant group first. Every byte but the last has its high bit set. The
//! longest legal varint is therefore ten bytes, the last of which may only
//! contribute a single bit.
//!
//! Signed `int32`/`int64` values are written as the two's-complement bit
//! pattern of their 64-bit sign extension, with no zig-zag transform, so a
//! negative `int32` always occupies ten bytes. The `sint32`/`sint64` kinds
//! apply the zig-zag mapping from [`zigzag_encode64`] before writing.

use std::fmt::{Display, Formatter};

use crate::conv::target::Target;

/// Maximum number of bytes in the encoding of a 64-bit varint
pub const MAX_VARINT_LEN: usize = 10;

/// Smallest legal field tag
pub const MIN_TAG: u32 = 1;

/// Largest legal field tag, leaving three bits of the 32-bit key for the wire kind
pub const MAX_TAG: u32 = (1 << 29) - 1;

/// Tags in this range are set aside by the protocol and may not be declared
pub const RESERVED_TAGS: std::ops::RangeInclusive<u32> = 19_000..=19_999;

/// Encoding category of a field payload, independent of its logical type
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum WireKind {
    /// Base-128 varint
    Varint = 0,
    /// Eight little-endian bytes
    Fixed64 = 1,
    /// Varint byte-length followed by that many raw bytes
    LengthDelimited = 2,
    /// Four little-endian bytes
    Fixed32 = 5,
}

impl WireKind {
    /// Interprets the low three bits of a field key.
    ///
    /// Returns `None` for the group markers (3, 4) and the unassigned values
    /// (6, 7), none of which this engine accepts.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}

impl Display for WireKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WireKind::Varint => "VARINT",
            WireKind::Fixed64 => "FIXED64",
            WireKind::LengthDelimited => "LENGTH_DELIMITED",
            WireKind::Fixed32 => "FIXED32",
        };
        f.write_str(name)
    }
}

/// Packs a tag and wire kind into the numeric value of a field key
#[inline]
#[must_use]
pub const fn make_key(tag: u32, wire: WireKind) -> u64 {
    ((tag as u64) << 3) | wire.as_raw() as u64
}

/// Splits a field key into its raw tag and raw wire-kind bits
#[inline]
#[must_use]
pub const fn split_key(key: u64) -> (u64, u8) {
    (key >> 3, (key & 0x07) as u8)
}

/// Appends the varint encoding of `val` to `buf`, returning the number of bytes written
pub fn write_varint<U: Target>(buf: &mut U, mut val: u64) -> usize {
    let mut n = 0;
    while val >= 0x80 {
        n += buf.push_one((val as u8 & 0x7f) | 0x80);
        val >>= 7;
    }
    n + buf.push_one(val as u8)
}

/// Appends a complete field key to `buf`
#[inline]
pub fn write_key<U: Target>(buf: &mut U, tag: u32, wire: WireKind) -> usize {
    write_varint(buf, make_key(tag, wire))
}

/// Number of bytes `write_varint` would emit for `val`
#[must_use]
pub const fn varint_len(val: u64) -> usize {
    let bits = 64 - (val | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

#[inline]
#[must_use]
pub const fn zigzag_encode32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

#[inline]
#[must_use]
pub const fn zigzag_decode32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

#[inline]
#[must_use]
pub const fn zigzag_encode64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
#[must_use]
pub const fn zigzag_decode64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}
