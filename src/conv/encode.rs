//! Wire encoder
//!
//! Fields are written in ascending tag order, each as one or more units of
//! `key | payload`. Unknown fields are re-emitted verbatim among the known
//! ones, in ascending tag order; where a known and an unknown field share a
//! tag, the known units come first.
//!
//! `int32`, `int64` and enum values are written as the two's complement
//! varint of their 64-bit sign extension, with no zig-zag transform, so a
//! negative value always takes ten bytes. Only `sint32` and `sint64` are
//! zig-zag encoded.
//!
//! A nested record is prefixed by its length, so every write is preceded by
//! one measuring pass over the whole tree. The lengths it finds are kept in
//! pre-order and handed out again, in the same order, while writing; no
//! record is measured twice.

use std::slice;

use crate::conv::error::EncodeError;
use crate::conv::target::{ByteCounter, Target};
use crate::record::{Record, Slot};
use crate::schema::field::FieldDescriptor;
use crate::value::Value;
use crate::wire::{self, WireKind};

/// Encoded lengths of a record and of every record nested in it, in pre-order
struct Sizes(Vec<usize>);

impl Sizes {
    fn of(record: &Record) -> Self {
        let mut sizes = Vec::new();
        record.measure(&mut sizes);
        Self(sizes)
    }

    fn total(&self) -> usize {
        self.0.first().copied().unwrap_or_default()
    }

    /// Lengths of the nested records, in the order the writer meets them
    fn nested(&self) -> SizeCursor<'_> {
        SizeCursor(self.0.get(1..).unwrap_or_default().iter())
    }
}

struct SizeCursor<'a>(slice::Iter<'a, usize>);

impl SizeCursor<'_> {
    fn take(&mut self) -> usize {
        let len = self.0.next().copied();
        debug_assert!(len.is_some(), "writer walked past the measured records");
        len.unwrap_or_default()
    }
}

impl Record {
    /// Checks that every required field, at every depth, is present.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::MissingRequired`] listing every absent path.
    pub fn check_required(&self) -> Result<(), EncodeError> {
        let paths = self.validate_required();
        if paths.is_empty() {
            Ok(())
        } else {
            Err(EncodeError::MissingRequired {
                message: self.message_name().to_owned(),
                paths,
            })
        }
    }

    /// Encodes the record into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Fails with [`EncodeError::MissingRequired`], before anything is
    /// written, if a required field is absent.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        self.check_required()?;
        let sizes = Sizes::of(self);
        let mut buf = Vec::with_capacity(sizes.total());
        self.write_measured(&mut buf, &mut sizes.nested());
        Ok(buf)
    }

    /// Encodes the record onto the end of `buf`, returning the number of
    /// bytes appended.
    ///
    /// # Errors
    ///
    /// As for [`encode`](Record::encode); `buf` is untouched on failure.
    pub fn encode_to<U: Target>(&self, buf: &mut U) -> Result<usize, EncodeError> {
        self.check_required()?;
        let sizes = Sizes::of(self);
        buf.anticipate(sizes.total());
        Ok(self.write_measured(buf, &mut sizes.nested()))
    }

    /// Exact length of the record's encoding
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.measure(&mut Vec::new())
    }

    /// Writes the record's encoding to `buf` without checking required
    /// fields, returning the number of bytes written.
    pub fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.write_measured(buf, &mut Sizes::of(self).nested())
    }

    /// Pushes this record's encoded length onto `sizes`, followed by those of
    /// its nested records, and returns it.
    fn measure(&self, sizes: &mut Vec<usize>) -> usize {
        let at = sizes.len();
        sizes.push(0);
        let mut counter = ByteCounter::create();
        let mut n: usize = self
            .unknown
            .tags()
            .map(|utag| self.unknown.write_tag_to(utag, &mut counter))
            .sum();
        for (&tag, slot) in &self.slots {
            if let Some(field) = self.descriptor.field(tag) {
                n += measure_field(field, slot, sizes);
            }
        }
        sizes[at] = n;
        n
    }

    fn write_measured<U: Target>(&self, buf: &mut U, sizes: &mut SizeCursor<'_>) -> usize {
        let mut n = 0;
        let mut unknown_tags = self.unknown.tags().peekable();
        for (&tag, slot) in &self.slots {
            while let Some(utag) = unknown_tags.next_if(|&utag| utag < tag) {
                n += self.unknown.write_tag_to(utag, buf);
            }
            if let Some(field) = self.descriptor.field(tag) {
                n += write_field(buf, field, slot, sizes);
            }
        }
        for utag in unknown_tags {
            n += self.unknown.write_tag_to(utag, buf);
        }
        n
    }
}

fn measure_field(field: &FieldDescriptor, slot: &Slot, sizes: &mut Vec<usize>) -> usize {
    let key_len = wire::varint_len(wire::make_key(field.tag(), field.wire_kind()));
    match slot {
        Slot::Single(value) => key_len + measure_payload(value, sizes),
        Slot::Repeated(_) if field.is_packed() => {
            write_field(&mut ByteCounter::create(), field, slot, &mut SizeCursor([].iter()))
        }
        Slot::Repeated(values) => values
            .iter()
            .map(|v| key_len + measure_payload(v, sizes))
            .sum(),
    }
}

fn measure_payload(value: &Value, sizes: &mut Vec<usize>) -> usize {
    match value {
        Value::Message(nested) => {
            let len = nested.measure(sizes);
            wire::varint_len(len as u64) + len
        }
        scalar => write_payload(&mut ByteCounter::create(), scalar, &mut SizeCursor([].iter())),
    }
}

fn write_field<U: Target>(
    buf: &mut U,
    field: &FieldDescriptor,
    slot: &Slot,
    sizes: &mut SizeCursor<'_>,
) -> usize {
    let tag = field.tag();
    match slot {
        Slot::Single(value) => write_unit(buf, tag, field.wire_kind(), value, sizes),
        Slot::Repeated(values) if values.is_empty() => 0,
        Slot::Repeated(values) if field.is_packed() => {
            let mut counter = ByteCounter::create();
            let len: usize = values
                .iter()
                .map(|v| write_payload(&mut counter, v, sizes))
                .sum();
            let mut n = wire::write_key(buf, tag, WireKind::LengthDelimited);
            n += wire::write_varint(buf, len as u64);
            values.iter().fold(n, |n, v| n + write_payload(buf, v, sizes))
        }
        Slot::Repeated(values) => values
            .iter()
            .map(|v| write_unit(buf, tag, field.wire_kind(), v, sizes))
            .sum(),
    }
}

#[inline]
fn write_unit<U: Target>(
    buf: &mut U,
    tag: u32,
    wire: WireKind,
    value: &Value,
    sizes: &mut SizeCursor<'_>,
) -> usize {
    wire::write_key(buf, tag, wire) + write_payload(buf, value, sizes)
}

/// Writes the payload of a single value, without its key
fn write_payload<U: Target>(buf: &mut U, value: &Value, sizes: &mut SizeCursor<'_>) -> usize {
    match value {
        Value::Int32(v) | Value::Enum(v) => wire::write_varint(buf, i64::from(*v) as u64),
        Value::Int64(v) => wire::write_varint(buf, *v as u64),
        Value::UInt32(v) => wire::write_varint(buf, u64::from(*v)),
        Value::UInt64(v) => wire::write_varint(buf, *v),
        Value::SInt32(v) => wire::write_varint(buf, u64::from(wire::zigzag_encode32(*v))),
        Value::SInt64(v) => wire::write_varint(buf, wire::zigzag_encode64(*v)),
        Value::Bool(v) => buf.push_one(u8::from(*v)),
        Value::Fixed32(v) => buf.push_many(v.to_le_bytes()),
        Value::SFixed32(v) => buf.push_many(v.to_le_bytes()),
        Value::Float(v) => buf.push_many(v.to_le_bytes()),
        Value::Fixed64(v) => buf.push_many(v.to_le_bytes()),
        Value::SFixed64(v) => buf.push_many(v.to_le_bytes()),
        Value::Double(v) => buf.push_many(v.to_le_bytes()),
        Value::String(s) => write_delimited(buf, s.as_bytes()),
        Value::Bytes(b) => write_delimited(buf, b),
        Value::Message(nested) => {
            let len = sizes.take();
            wire::write_varint(buf, len as u64) + nested.write_measured(buf, sizes)
        }
    }
}

#[inline]
fn write_delimited<U: Target>(buf: &mut U, bytes: &[u8]) -> usize {
    wire::write_varint(buf, bytes.len() as u64) + buf.push_all(bytes)
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use super::*;
    use crate::record::unknown::UnknownField;
    use crate::schema::field::ValueKind;
    use crate::schema::message::MessageDescriptor;
    use crate::schema::registry::fixtures::{self, BOOK, PERSON};
    use crate::schema::registry::Registry;

    fn scalars() -> Arc<Registry> {
        Registry::builder()
            .message(
                MessageDescriptor::describe(
                    "Scalars",
                    [
                        FieldDescriptor::optional("i32", 1, ValueKind::Int32),
                        FieldDescriptor::optional("s32", 2, ValueKind::SInt32),
                        FieldDescriptor::optional("f32", 3, ValueKind::Fixed32),
                        FieldDescriptor::optional("dbl", 4, ValueKind::Double),
                        FieldDescriptor::optional("flag", 5, ValueKind::Bool),
                        FieldDescriptor::repeated("packed", 6, ValueKind::UInt32).packed(),
                        FieldDescriptor::repeated("loose", 7, ValueKind::UInt32),
                        FieldDescriptor::optional("u64", 8, ValueKind::UInt64),
                    ],
                )
                .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn person_bytes() {
        let registry = fixtures::address_book();
        let mut person = Record::new(&registry, PERSON).unwrap();
        person.set(2, Value::Int32(150)).unwrap();
        person.set(1, Value::from("Ann")).unwrap();
        assert_eq!(
            person.encode().unwrap(),
            vec![0x0a, 0x03, b'A', b'n', b'n', 0x10, 0x96, 0x01]
        );
        assert_eq!(person.encoded_len(), 8);
    }

    #[test]
    fn negative_int32_takes_ten_bytes() {
        let registry = scalars();
        let mut rec = Record::new(&registry, "Scalars").unwrap();
        rec.set(1, Value::Int32(-1)).unwrap();
        let mut expected = vec![0x08];
        expected.extend([0xff; 9]);
        expected.push(0x01);
        assert_eq!(rec.encode().unwrap(), expected);

        rec.clear(1).unwrap();
        rec.set(2, Value::SInt32(-1)).unwrap();
        assert_eq!(rec.encode().unwrap(), vec![0x10, 0x01]);
    }

    #[test]
    fn fixed_width_is_little_endian() {
        let registry = scalars();
        let mut rec = Record::new(&registry, "Scalars").unwrap();
        rec.set(3, Value::Fixed32(0x0403_0201)).unwrap();
        rec.set(4, Value::Double(1.0)).unwrap();
        rec.set(5, Value::Bool(true)).unwrap();
        assert_eq!(
            rec.encode().unwrap(),
            vec![
                0x1d, 0x01, 0x02, 0x03, 0x04, //
                0x21, 0, 0, 0, 0, 0, 0, 0xf0, 0x3f, //
                0x28, 0x01,
            ]
        );
    }

    #[test]
    fn packed_and_unpacked_repeated() {
        let registry = scalars();
        let mut rec = Record::new(&registry, "Scalars").unwrap();
        for v in [1u32, 300, 2] {
            rec.append(6, Value::UInt32(v)).unwrap();
            rec.append(7, Value::UInt32(v)).unwrap();
        }
        assert_eq!(
            rec.encode().unwrap(),
            vec![
                0x32, 0x04, 0x01, 0xac, 0x02, 0x02, //
                0x38, 0x01, 0x38, 0xac, 0x02, 0x38, 0x02,
            ]
        );
    }

    #[test]
    fn nested_messages_are_length_prefixed() {
        let registry = fixtures::address_book();
        let mut book = Record::new(&registry, BOOK).unwrap();
        let ann = book.add_message(1).unwrap();
        ann.set(1, Value::from("A")).unwrap();
        ann.set(2, Value::Int32(1)).unwrap();
        assert_eq!(
            book.encode().unwrap(),
            vec![0x0a, 0x05, 0x0a, 0x01, b'A', 0x10, 0x01]
        );
    }

    #[test]
    fn lengths_follow_the_tree() {
        let registry = fixtures::linked();
        let mut top = Record::new(&registry, "Node").unwrap();
        top.set(1, Value::Int32(1)).unwrap();
        let next = top.message_mut(2).unwrap();
        next.set(1, Value::Int32(2)).unwrap();
        next.add_message(3).unwrap().set(1, Value::Int32(3)).unwrap();
        top.add_message(3).unwrap().set(1, Value::Int32(4)).unwrap();
        top.add_message(3).unwrap();
        top.unknown
            .push(UnknownField::new(5, WireKind::Varint, vec![0x28, 0x01]));

        let expected = vec![
            0x08, 0x01, // value
            0x12, 0x06, 0x08, 0x02, 0x1a, 0x02, 0x08, 0x03, // next
            0x1a, 0x02, 0x08, 0x04, // children[0]
            0x1a, 0x00, // children[1]
            0x28, 0x01, // unknown 5
        ];
        assert_eq!(top.encoded_len(), expected.len());
        assert_eq!(top.encode().unwrap(), expected);
        let mut out = vec![0xff];
        assert_eq!(top.write_to(&mut out), expected.len());
        assert_eq!(out[1..], expected[..]);
    }

    #[test]
    fn deep_nesting_is_linear() {
        let registry = fixtures::linked();
        let mut top = Record::new(&registry, "Node").unwrap();
        let mut node = &mut top;
        for _ in 0..200 {
            node = node.message_mut(2).unwrap();
        }
        node.set(1, Value::Int32(7)).unwrap();

        let bytes = top.encode().unwrap();
        assert_eq!(bytes.len(), top.encoded_len());
        assert_eq!(bytes[bytes.len() - 2..], [0x08, 0x07]);
    }

    #[test]
    fn missing_required_produces_nothing() {
        let registry = fixtures::address_book();
        let mut book = Record::new(&registry, BOOK).unwrap();
        book.add_message(1).unwrap().set(1, Value::from("Ann")).unwrap();

        let mut out = vec![0xaa];
        let err = book.encode_to(&mut out).unwrap_err();
        assert_eq!(err.missing(), &BTreeSet::from(["people[0].id".to_owned()]));
        assert_eq!(out, vec![0xaa]);
        assert!(book.encode().is_err());

        // the unchecked path still writes what is there
        assert_eq!(book.write_to(&mut out), 7);
    }

    #[test]
    fn unknown_fields_interleave_by_tag() {
        let registry = scalars();
        let mut rec = Record::new(&registry, "Scalars").unwrap();
        rec.set(1, Value::Int32(1)).unwrap();
        rec.set(8, Value::UInt64(8)).unwrap();
        rec.unknown
            .push(UnknownField::new(20, WireKind::Varint, vec![0xa0, 0x01, 0x14]));
        rec.unknown
            .push(UnknownField::new(1, WireKind::Varint, vec![0x08, 0x7f]));
        rec.unknown
            .push(UnknownField::new(3, WireKind::Fixed32, vec![0x1d, 1, 2, 3, 4]));
        assert_eq!(
            rec.encode().unwrap(),
            vec![
                0x08, 0x01, // known 1
                0x08, 0x7f, // unknown 1
                0x1d, 1, 2, 3, 4, // unknown 3
                0x40, 0x08, // known 8
                0xa0, 0x01, 0x14, // unknown 20
            ]
        );
    }

    #[test]
    fn encoded_len_matches_output() {
        let registry = scalars();
        let mut rec = Record::new(&registry, "Scalars").unwrap();
        rec.set(8, Value::UInt64(u64::MAX)).unwrap();
        rec.append(6, Value::UInt32(u32::MAX)).unwrap();
        let bytes = rec.encode().unwrap();
        assert_eq!(bytes.len(), rec.encoded_len());
        assert_eq!(rec.encode_to(&mut Vec::<u8>::new()).unwrap(), bytes.len());
    }
}
