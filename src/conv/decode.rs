//! Wire decoder
//!
//! Decoding reads field units until the input (or, for a nested record, the
//! context window of its length prefix) is exhausted. Declared fields are
//! decoded according to their value kind; everything else is kept verbatim
//! in the record's [`UnknownFieldSet`](crate::record::unknown::UnknownFieldSet).
//!
//! Singular scalar fields that occur more than once take the last value.
//! Repeated fields accumulate, accepting both the packed and the unpacked
//! form for any packable kind. A singular message field that occurs more
//! than once is merged, not replaced.
//!
//! Decoding always builds a fresh record, so a failure never leaves a
//! partially decoded value where the caller can see it.

use std::sync::Arc;

use tracing::trace;

use crate::conv::error::{DecodeError, DecodeResult};
use crate::parse::byteparser::ByteParser;
use crate::parse::error::ParseError;
use crate::parse::{ParseResult, Parser};
use crate::record::unknown::UnknownField;
use crate::record::{Record, Slot};
use crate::schema::field::{FieldDescriptor, ValueKind};
use crate::schema::registry::Registry;
use crate::value::Value;
use crate::wire::{self, WireKind, MAX_TAG};

/// Nesting depth at which decoding gives up, unless configured otherwise
pub const DEFAULT_RECURSION_LIMIT: usize = 100;

/// Runtime knobs for [`Record::decode_with`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum depth of nested records; the top-level record is depth 0
    pub recursion_limit: usize,
    /// Reject decoded records that lack a required field
    pub check_required: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            check_required: false,
        }
    }
}

impl DecodeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_check_required(mut self, check: bool) -> Self {
        self.check_required = check;
        self
    }
}

#[inline]
fn at(offset: usize) -> impl FnOnce(ParseError) -> DecodeError {
    move |source| DecodeError::Parse { offset, source }
}

/// Reads one payload of a kind that may appear in a packed run.
///
/// Returns `None` for length-delimited kinds, which have no fixed payload
/// shape to pack.
fn read_packable<P: Parser>(p: &mut P, kind: &ValueKind) -> ParseResult<Option<Value>> {
    Ok(Some(match kind {
        ValueKind::Int32 => Value::Int32(p.take_varint()? as i32),
        ValueKind::Int64 => Value::Int64(p.take_varint()? as i64),
        ValueKind::UInt32 => Value::UInt32(p.take_varint()? as u32),
        ValueKind::UInt64 => Value::UInt64(p.take_varint()?),
        ValueKind::SInt32 => Value::SInt32(wire::zigzag_decode32(p.take_varint()? as u32)),
        ValueKind::SInt64 => Value::SInt64(wire::zigzag_decode64(p.take_varint()?)),
        ValueKind::Bool => Value::Bool(p.take_varint()? != 0),
        ValueKind::Enum(_) => Value::Enum(p.take_varint()? as i32),
        ValueKind::Fixed32 => Value::Fixed32(p.take_fixed32()?),
        ValueKind::SFixed32 => Value::SFixed32(p.take_fixed32()? as i32),
        ValueKind::Float => Value::Float(f32::from_bits(p.take_fixed32()?)),
        ValueKind::Fixed64 => Value::Fixed64(p.take_fixed64()?),
        ValueKind::SFixed64 => Value::SFixed64(p.take_fixed64()? as i64),
        ValueKind::Double => Value::Double(f64::from_bits(p.take_fixed64()?)),
        ValueKind::String | ValueKind::Bytes | ValueKind::Message(_) => return Ok(None),
    }))
}

impl Record {
    /// Decodes `bytes` as a record of the message type `name`, with default
    /// [`DecodeOptions`].
    ///
    /// An empty input yields an empty record. Required fields are not
    /// checked; call [`validate_required`](Record::validate_required) on the
    /// result, or use [`decode_with`](Record::decode_with), where that
    /// guarantee is needed.
    ///
    /// # Errors
    ///
    /// Fails with a [`DecodeError`] on truncated or malformed input, or on a
    /// declared field whose wire kind does not match its value kind.
    pub fn decode(registry: &Arc<Registry>, name: &str, bytes: &[u8]) -> DecodeResult<Self> {
        Self::decode_with(registry, name, bytes, &DecodeOptions::default())
    }

    /// Decodes `bytes` as a record of the message type `name`.
    ///
    /// # Errors
    ///
    /// As for [`decode`](Record::decode), and additionally
    /// [`DecodeError::RecursionLimit`] when records nest deeper than
    /// `opts.recursion_limit`, and [`DecodeError::MissingRequired`] when
    /// `opts.check_required` is set and a required field is absent.
    pub fn decode_with(
        registry: &Arc<Registry>,
        name: &str,
        bytes: &[u8],
        opts: &DecodeOptions,
    ) -> DecodeResult<Self> {
        let mut record =
            Record::new(registry, name).map_err(|_| DecodeError::UnknownMessage(name.to_owned()))?;
        record.read_from(bytes, opts)?;
        if opts.check_required {
            let paths = record.validate_required();
            if !paths.is_empty() {
                return Err(DecodeError::MissingRequired {
                    message: name.to_owned(),
                    paths,
                });
            }
        }
        Ok(record)
    }

    /// Decodes `bytes` as a record of this record's type and merges the
    /// result in, as by [`merge_from`](Record::merge_from).
    ///
    /// # Errors
    ///
    /// As for [`decode`](Record::decode). On failure `self` is unchanged.
    pub fn merge_from_bytes(&mut self, bytes: &[u8]) -> DecodeResult<()> {
        let mut fresh =
            Record::with_descriptor(Arc::clone(&self.registry), Arc::clone(&self.descriptor));
        fresh.read_from(bytes, &DecodeOptions::default())?;
        self.absorb(fresh);
        Ok(())
    }

    fn read_from(&mut self, bytes: &[u8], opts: &DecodeOptions) -> DecodeResult<()> {
        let mut p = ByteParser::new(bytes);
        self.read_fields(&mut p, opts, 0)?;
        cfg_if::cfg_if! {
            if #[cfg(feature = "check_complete_parse")] {
                debug_assert_eq!(p.window_depth(), 0);
                debug_assert_eq!(p.offset(), p.buffer_len());
            }
        }
        trace!(
            record = %self.message_name(),
            len = bytes.len(),
            unknown = self.unknown.len(),
            "decoded record"
        );
        Ok(())
    }

    fn read_fields<P: Parser>(
        &mut self,
        p: &mut P,
        opts: &DecodeOptions,
        depth: usize,
    ) -> DecodeResult<()> {
        let descriptor = Arc::clone(&self.descriptor);
        while p.remainder() > 0 {
            let start = p.offset();
            let key = p.take_varint().map_err(at(start))?;
            let (raw_tag, raw_wire) = wire::split_key(key);
            if raw_tag == 0 || raw_tag > u64::from(MAX_TAG) {
                return Err(DecodeError::InvalidTag {
                    offset: start,
                    tag: raw_tag,
                });
            }
            let wire = WireKind::from_raw(raw_wire).ok_or(DecodeError::InvalidWireKind {
                offset: start,
                tag: raw_tag,
                raw: raw_wire,
            })?;
            let tag = raw_tag as u32;
            match descriptor.field(tag) {
                Some(field) => self.read_known(p, field, wire, start, opts, depth)?,
                None => self.read_unknown(p, tag, wire, start)?,
            }
        }
        Ok(())
    }

    fn read_unknown<P: Parser>(
        &mut self,
        p: &mut P,
        tag: u32,
        wire: WireKind,
        start: usize,
    ) -> DecodeResult<()> {
        let payload_at = p.offset();
        match wire {
            WireKind::Varint => p.take_varint().map(drop),
            WireKind::Fixed64 => p.consume(8).map(drop),
            WireKind::LengthDelimited => p.take_length_delimited().map(drop),
            WireKind::Fixed32 => p.consume(4).map(drop),
        }
        .map_err(at(payload_at))?;
        let raw = p.lookback(start).to_vec();
        self.keep_unknown(UnknownField::new(tag, wire, raw));
        Ok(())
    }

    fn read_known<P: Parser>(
        &mut self,
        p: &mut P,
        field: &FieldDescriptor,
        wire: WireKind,
        start: usize,
        opts: &DecodeOptions,
        depth: usize,
    ) -> DecodeResult<()> {
        if wire != field.wire_kind() {
            if wire == WireKind::LengthDelimited && field.is_repeated() && field.kind().is_packable()
            {
                return self.read_packed(p, field, start);
            }
            return Err(self.wire_mismatch(field, wire, start));
        }
        let payload_at = p.offset();
        let value = match field.kind() {
            ValueKind::Message(target) => {
                return self.read_nested(p, field, target, opts, depth);
            }
            ValueKind::String => {
                let bytes = p.take_length_delimited().map_err(at(payload_at))?;
                let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 {
                    message: self.message_name().to_owned(),
                    tag: field.tag(),
                    offset: payload_at,
                })?;
                Value::String(text.to_owned())
            }
            ValueKind::Bytes => {
                Value::Bytes(p.take_length_delimited().map_err(at(payload_at))?.to_vec())
            }
            kind => read_packable(p, kind)
                .map_err(at(payload_at))?
                .ok_or_else(|| self.wire_mismatch(field, wire, start))?,
        };
        if self.is_undeclared_enum(field, &value) {
            let raw = p.lookback(start).to_vec();
            self.keep_unknown(UnknownField::new(field.tag(), wire, raw));
            return Ok(());
        }
        self.store(field, value);
        Ok(())
    }

    fn read_packed<P: Parser>(
        &mut self,
        p: &mut P,
        field: &FieldDescriptor,
        start: usize,
    ) -> DecodeResult<()> {
        let payload_at = p.offset();
        let len = p.take_varint().map_err(at(payload_at))?;
        p.set_fit(usize::try_from(len).unwrap_or(usize::MAX))
            .map_err(at(payload_at))?;
        while p.remainder() > 0 {
            let elem_at = p.offset();
            let value = read_packable(p, field.kind())
                .map_err(at(elem_at))?
                .ok_or_else(|| self.wire_mismatch(field, WireKind::LengthDelimited, start))?;
            if self.is_undeclared_enum(field, &value) {
                // kept as a standalone unpacked unit, which is how it would
                // have been written by a peer that knew nothing of packing
                let mut raw = Vec::new();
                wire::write_key(&mut raw, field.tag(), WireKind::Varint);
                raw.extend_from_slice(p.lookback(elem_at));
                self.keep_unknown(UnknownField::new(field.tag(), WireKind::Varint, raw));
                continue;
            }
            self.store(field, value);
        }
        p.enforce_target().map_err(at(p.offset()))
    }

    fn read_nested<P: Parser>(
        &mut self,
        p: &mut P,
        field: &FieldDescriptor,
        target: &str,
        opts: &DecodeOptions,
        depth: usize,
    ) -> DecodeResult<()> {
        if depth >= opts.recursion_limit {
            return Err(DecodeError::RecursionLimit {
                limit: opts.recursion_limit,
            });
        }
        let payload_at = p.offset();
        let len = p.take_varint().map_err(at(payload_at))?;
        p.set_fit(usize::try_from(len).unwrap_or(usize::MAX))
            .map_err(at(payload_at))?;
        let fresh = self
            .spawn(target)
            .map_err(|_| DecodeError::UnknownMessage(target.to_owned()))?;
        let nested = self
            .attach_nested(field, fresh)
            .ok_or_else(|| DecodeError::UnknownMessage(target.to_owned()))?;
        nested.read_fields(p, opts, depth + 1)?;
        p.enforce_target().map_err(at(p.offset()))
    }

    /// Returns the record that a nested payload for `field` decodes into:
    /// a new element for repeated fields, and for singular fields the record
    /// already present (if any) so that repeated occurrences merge.
    fn attach_nested(&mut self, field: &FieldDescriptor, fresh: Record) -> Option<&mut Record> {
        if field.is_repeated() {
            let slot = self
                .slots
                .entry(field.tag())
                .or_insert_with(|| Slot::Repeated(Vec::new()));
            match slot {
                Slot::Repeated(values) => {
                    values.push(Value::Message(fresh));
                    values.last_mut().and_then(Value::as_message_mut)
                }
                Slot::Single(_) => None,
            }
        } else {
            let slot = self
                .slots
                .entry(field.tag())
                .or_insert(Slot::Single(Value::Message(fresh)));
            match slot {
                Slot::Single(value) => value.as_message_mut(),
                Slot::Repeated(_) => None,
            }
        }
    }

    fn is_undeclared_enum(&self, field: &FieldDescriptor, value: &Value) -> bool {
        match (field.kind(), value) {
            (ValueKind::Enum(target), Value::Enum(number)) => !self
                .registry
                .enumeration(target)
                .is_some_and(|desc| desc.contains(*number)),
            _ => false,
        }
    }

    fn store(&mut self, field: &FieldDescriptor, value: Value) {
        if field.is_repeated() {
            match self
                .slots
                .entry(field.tag())
                .or_insert_with(|| Slot::Repeated(Vec::new()))
            {
                Slot::Repeated(values) => values.push(value),
                slot @ Slot::Single(_) => *slot = Slot::Repeated(vec![value]),
            }
        } else {
            self.slots.insert(field.tag(), Slot::Single(value));
        }
    }

    fn keep_unknown(&mut self, unit: UnknownField) {
        trace!(
            record = %self.message_name(),
            tag = unit.tag(),
            wire = %unit.wire_kind(),
            len = unit.raw().len(),
            "kept unknown field"
        );
        self.unknown.push(unit);
    }

    fn wire_mismatch(&self, field: &FieldDescriptor, actual: WireKind, offset: usize) -> DecodeError {
        DecodeError::WireKindMismatch {
            message: self.message_name().to_owned(),
            tag: field.tag(),
            expected: field.wire_kind(),
            actual,
            offset,
        }
    }
}
