//! Dynamic, in-memory instances of message types
//!
//! A [`Record`] is bound to one [`MessageDescriptor`] and holds the values of
//! its fields keyed by tag. Presence is explicit: a field is either absent
//! from the record or holds a value, regardless of whether that value happens
//! to equal the field's default.
//!
//! Every value stored through [`Record::set`] or [`Record::append`] is
//! checked against its field's declared kind. Required fields are not
//! checked on mutation at all; they are checked at the encode boundary, or
//! on request through [`Record::validate_required`].
//!
//! Nested records are owned by their parent. The mutable accessors
//! [`Record::message_mut`] and [`Record::add_message`] hand out a `&mut`
//! borrow of the nested record in place, so that anything done through it is
//! immediately part of the parent.

use std::borrow::Cow;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::error::RecordError;
use crate::schema::field::{Cardinality, FieldDescriptor, ValueKind};
use crate::schema::message::MessageDescriptor;
use crate::schema::registry::Registry;
use crate::value::Value;

use self::unknown::UnknownFieldSet;

mod display;
pub mod unknown;

/// Storage for one present field
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Slot {
    Single(Value),
    /// Never empty; a repeated field with no elements has no slot at all
    Repeated(Vec<Value>),
}

/// Mutable instance of a message type
#[derive(Clone)]
pub struct Record {
    pub(crate) registry: Arc<Registry>,
    pub(crate) descriptor: Arc<MessageDescriptor>,
    pub(crate) slots: BTreeMap<u32, Slot>,
    pub(crate) unknown: UnknownFieldSet,
}

fn lookup(descriptor: &MessageDescriptor, tag: u32) -> Result<&FieldDescriptor, RecordError> {
    descriptor.field(tag).ok_or_else(|| RecordError::UnknownField {
        message: descriptor.name().to_owned(),
        tag,
    })
}

fn wrong_cardinality(
    descriptor: &MessageDescriptor,
    field: &FieldDescriptor,
    hint: &'static str,
) -> RecordError {
    RecordError::Cardinality {
        message: descriptor.name().to_owned(),
        field: field.name().to_owned(),
        cardinality: field.cardinality(),
        hint,
    }
}

fn not_a_message(descriptor: &MessageDescriptor, field: &FieldDescriptor) -> RecordError {
    RecordError::TypeMismatch {
        message: descriptor.name().to_owned(),
        field: field.name().to_owned(),
        expected: field.kind().to_string(),
        actual: "message".to_owned(),
    }
}

impl Record {
    /// Creates an empty record of the message type named `name`.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::UnknownMessage`] if `registry` has no such type.
    pub fn new(registry: &Arc<Registry>, name: &str) -> Result<Self, RecordError> {
        let descriptor = registry
            .message(name)
            .ok_or_else(|| RecordError::UnknownMessage(name.to_owned()))?;
        Ok(Self::with_descriptor(
            Arc::clone(registry),
            Arc::clone(descriptor),
        ))
    }

    pub(crate) fn with_descriptor(
        registry: Arc<Registry>,
        descriptor: Arc<MessageDescriptor>,
    ) -> Self {
        Self {
            registry,
            descriptor,
            slots: BTreeMap::new(),
            unknown: UnknownFieldSet::new(),
        }
    }

    /// Creates an empty record of the named type, sharing this record's registry
    pub(crate) fn spawn(&self, name: &str) -> Result<Self, RecordError> {
        Self::new(&self.registry, name)
    }

    #[inline]
    #[must_use]
    pub fn message_name(&self) -> &str {
        self.descriptor.name()
    }

    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    fn check_value(&self, field: &FieldDescriptor, value: &Value) -> Result<(), RecordError> {
        let mismatch = |actual: String| RecordError::TypeMismatch {
            message: self.message_name().to_owned(),
            field: field.name().to_owned(),
            expected: field.kind().to_string(),
            actual,
        };
        if !value.is_of_kind(field.kind()) {
            return Err(mismatch(value.describe_kind()));
        }
        if let (ValueKind::Enum(target), Value::Enum(number)) = (field.kind(), value) {
            let declared = self
                .registry
                .enumeration(target)
                .is_some_and(|desc| desc.contains(*number));
            if !declared {
                return Err(mismatch(format!("undeclared value {number}")));
            }
        }
        Ok(())
    }

    /// Stores `value` in a singular field and marks it present.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::UnknownField`] if `tag` is not declared,
    /// [`RecordError::Cardinality`] if the field is repeated, and
    /// [`RecordError::TypeMismatch`] if `value` does not match the field's
    /// kind (for enum fields, if the number is not a declared value). The
    /// record is unchanged on failure.
    pub fn set(&mut self, tag: u32, value: Value) -> Result<(), RecordError> {
        let descriptor = Arc::clone(&self.descriptor);
        let field = lookup(&descriptor, tag)?;
        if field.is_repeated() {
            return Err(wrong_cardinality(&descriptor, field, "append"));
        }
        self.check_value(field, &value)?;
        self.slots.insert(tag, Slot::Single(value));
        Ok(())
    }

    /// Appends `value` to a repeated field.
    ///
    /// # Errors
    ///
    /// As for [`set`](Record::set), except that the field must be repeated.
    pub fn append(&mut self, tag: u32, value: Value) -> Result<(), RecordError> {
        let descriptor = Arc::clone(&self.descriptor);
        let field = lookup(&descriptor, tag)?;
        if !field.is_repeated() {
            return Err(wrong_cardinality(&descriptor, field, "set"));
        }
        self.check_value(field, &value)?;
        match self.slots.entry(tag) {
            Entry::Vacant(entry) => {
                entry.insert(Slot::Repeated(vec![value]));
            }
            Entry::Occupied(mut entry) => match entry.get_mut() {
                Slot::Repeated(values) => values.push(value),
                Slot::Single(_) => return Err(wrong_cardinality(&descriptor, field, "set")),
            },
        }
        Ok(())
    }

    /// Returns the value of a singular field, or its default when unset.
    ///
    /// The default is the field's declared default if it has one, and
    /// otherwise the implicit default of its kind: zero, `false`, empty, the
    /// first declared value of an enum, or an empty record. Reading never
    /// modifies the record; to populate a nested record in place use
    /// [`message_mut`](Record::message_mut).
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::UnknownField`] for an undeclared tag, and
    /// with [`RecordError::Cardinality`] for a repeated field.
    pub fn get(&self, tag: u32) -> Result<Cow<'_, Value>, RecordError> {
        let field = lookup(&self.descriptor, tag)?;
        if field.is_repeated() {
            return Err(wrong_cardinality(&self.descriptor, field, "get_repeated"));
        }
        match self.slots.get(&tag) {
            Some(Slot::Single(value)) => Ok(Cow::Borrowed(value)),
            _ => self.default_for(field).map(Cow::Owned),
        }
    }

    fn default_for(&self, field: &FieldDescriptor) -> Result<Value, RecordError> {
        if let Some(default) = field.default_value() {
            return Ok(default.clone());
        }
        Ok(match field.kind() {
            ValueKind::Int32 => Value::Int32(0),
            ValueKind::Int64 => Value::Int64(0),
            ValueKind::UInt32 => Value::UInt32(0),
            ValueKind::UInt64 => Value::UInt64(0),
            ValueKind::SInt32 => Value::SInt32(0),
            ValueKind::SInt64 => Value::SInt64(0),
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Enum(target) => Value::Enum(
                self.registry
                    .enumeration(target)
                    .map_or(0, |desc| desc.default_number()),
            ),
            ValueKind::Fixed32 => Value::Fixed32(0),
            ValueKind::SFixed32 => Value::SFixed32(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Fixed64 => Value::Fixed64(0),
            ValueKind::SFixed64 => Value::SFixed64(0),
            ValueKind::Double => Value::Double(0.0),
            ValueKind::String => Value::String(String::new()),
            ValueKind::Bytes => Value::Bytes(Vec::new()),
            ValueKind::Message(target) => Value::Message(self.spawn(target)?),
        })
    }

    /// Returns the elements of a repeated field, in append order.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::UnknownField`] for an undeclared tag, and
    /// with [`RecordError::Cardinality`] for a singular field.
    pub fn get_repeated(&self, tag: u32) -> Result<&[Value], RecordError> {
        let field = lookup(&self.descriptor, tag)?;
        if !field.is_repeated() {
            return Err(wrong_cardinality(&self.descriptor, field, "get"));
        }
        match self.slots.get(&tag) {
            Some(Slot::Repeated(values)) => Ok(values),
            _ => Ok(&[]),
        }
    }

    /// Number of values held by a field: 0 or 1 for singular fields, the
    /// element count for repeated ones.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::UnknownField`] for an undeclared tag.
    pub fn field_len(&self, tag: u32) -> Result<usize, RecordError> {
        lookup(&self.descriptor, tag)?;
        Ok(match self.slots.get(&tag) {
            None => 0,
            Some(Slot::Single(_)) => 1,
            Some(Slot::Repeated(values)) => values.len(),
        })
    }

    /// Returns the nested record held by a singular message field, creating
    /// and attaching an empty one first if the field is unset.
    ///
    /// After this call the field is set, even if nothing is ever written to
    /// the nested record.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::UnknownField`] for an undeclared tag,
    /// [`RecordError::Cardinality`] for a repeated field, and
    /// [`RecordError::TypeMismatch`] if the field is not message-typed.
    pub fn message_mut(&mut self, tag: u32) -> Result<&mut Record, RecordError> {
        let descriptor = Arc::clone(&self.descriptor);
        let field = lookup(&descriptor, tag)?;
        if field.is_repeated() {
            return Err(wrong_cardinality(&descriptor, field, "add_message"));
        }
        let ValueKind::Message(target) = field.kind() else {
            return Err(not_a_message(&descriptor, field));
        };
        if !self.slots.contains_key(&tag) {
            let nested = self.spawn(target)?;
            self.slots.insert(tag, Slot::Single(Value::Message(nested)));
        }
        match self.slots.get_mut(&tag) {
            Some(Slot::Single(Value::Message(nested))) => Ok(nested),
            _ => Err(not_a_message(&descriptor, field)),
        }
    }

    /// Appends an empty record to a repeated message field and returns it.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::UnknownField`] for an undeclared tag,
    /// [`RecordError::Cardinality`] for a singular field, and
    /// [`RecordError::TypeMismatch`] if the field is not message-typed.
    pub fn add_message(&mut self, tag: u32) -> Result<&mut Record, RecordError> {
        let descriptor = Arc::clone(&self.descriptor);
        let field = lookup(&descriptor, tag)?;
        if !field.is_repeated() {
            return Err(wrong_cardinality(&descriptor, field, "message_mut"));
        }
        let ValueKind::Message(target) = field.kind() else {
            return Err(not_a_message(&descriptor, field));
        };
        let nested = self.spawn(target)?;
        let slot = self
            .slots
            .entry(tag)
            .or_insert_with(|| Slot::Repeated(Vec::new()));
        match slot {
            Slot::Repeated(values) => {
                values.push(Value::Message(nested));
                match values.last_mut() {
                    Some(Value::Message(nested)) => Ok(nested),
                    _ => Err(not_a_message(&descriptor, field)),
                }
            }
            Slot::Single(_) => Err(wrong_cardinality(&descriptor, field, "message_mut")),
        }
    }

    /// Returns the `index`th element of a repeated message field.
    ///
    /// # Errors
    ///
    /// As for [`add_message`](Record::add_message), and additionally
    /// [`RecordError::IndexOutOfRange`] if there is no such element.
    pub fn repeated_message_mut(
        &mut self,
        tag: u32,
        index: usize,
    ) -> Result<&mut Record, RecordError> {
        let descriptor = Arc::clone(&self.descriptor);
        let field = lookup(&descriptor, tag)?;
        if !field.is_repeated() {
            return Err(wrong_cardinality(&descriptor, field, "message_mut"));
        }
        if !field.kind().is_message() {
            return Err(not_a_message(&descriptor, field));
        }
        let values: &mut [Value] = match self.slots.get_mut(&tag) {
            Some(Slot::Repeated(values)) => values,
            _ => &mut [],
        };
        let len = values.len();
        match values.get_mut(index) {
            Some(Value::Message(nested)) => Ok(nested),
            _ => Err(RecordError::IndexOutOfRange {
                message: descriptor.name().to_owned(),
                field: field.name().to_owned(),
                index,
                len,
            }),
        }
    }

    /// Whether the field is present. Undeclared tags are never present.
    #[must_use]
    pub fn is_set(&self, tag: u32) -> bool {
        self.slots.contains_key(&tag)
    }

    /// Unsets a field; a repeated field becomes empty.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::UnknownField`] for an undeclared tag.
    pub fn clear(&mut self, tag: u32) -> Result<(), RecordError> {
        lookup(&self.descriptor, tag)?;
        self.slots.remove(&tag);
        Ok(())
    }

    /// Whether no field is set and no unknown field is held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.unknown.is_empty()
    }

    /// Fields that were decoded but are not declared by this record's type
    #[must_use]
    pub fn unknown_fields(&self) -> &UnknownFieldSet {
        &self.unknown
    }

    /// Drops all unknown fields, here and in every nested record
    pub fn discard_unknown(&mut self) {
        self.unknown.clear();
        for slot in self.slots.values_mut() {
            match slot {
                Slot::Single(Value::Message(nested)) => nested.discard_unknown(),
                Slot::Repeated(values) => {
                    for value in values {
                        if let Value::Message(nested) = value {
                            nested.discard_unknown();
                        }
                    }
                }
                Slot::Single(_) => {}
            }
        }
    }

    /// Collects the paths of every absent required field, here and in every
    /// nested record.
    ///
    /// Paths are dotted field names, with an element index after repeated
    /// fields: `people[0].phones[1].number`. An empty set means the record
    /// can be encoded.
    #[must_use]
    pub fn validate_required(&self) -> BTreeSet<String> {
        let mut missing = BTreeSet::new();
        self.collect_missing("", &mut missing);
        missing
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.validate_required().is_empty()
    }

    fn collect_missing(&self, prefix: &str, missing: &mut BTreeSet<String>) {
        for field in self.descriptor.fields() {
            let path = if prefix.is_empty() {
                field.name().to_owned()
            } else {
                format!("{prefix}.{}", field.name())
            };
            match self.slots.get(&field.tag()) {
                None if field.cardinality() == Cardinality::Required => {
                    missing.insert(path);
                }
                Some(Slot::Single(Value::Message(nested))) => nested.collect_missing(&path, missing),
                Some(Slot::Repeated(values)) if field.kind().is_message() => {
                    for (ix, value) in values.iter().enumerate() {
                        if let Value::Message(nested) = value {
                            nested.collect_missing(&format!("{path}[{ix}]"), missing);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Merges a copy of `other` into this record.
    ///
    /// Set singular fields of `other` overwrite those here, except that
    /// message fields present on both sides are merged recursively.
    /// Repeated fields are appended to, and unknown fields of `other` are
    /// appended after those held here.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::MessageMismatch`] if `other` is of a
    /// different message type.
    pub fn merge_from(&mut self, other: &Record) -> Result<(), RecordError> {
        if other.message_name() != self.message_name() {
            return Err(RecordError::MessageMismatch {
                expected: self.message_name().to_owned(),
                actual: other.message_name().to_owned(),
            });
        }
        self.absorb(other.clone());
        Ok(())
    }

    /// Moves every value of `other` into this record, with the semantics of
    /// [`merge_from`](Record::merge_from). Both must be of the same type.
    pub(crate) fn absorb(&mut self, other: Record) {
        for (tag, slot) in other.slots {
            match slot {
                Slot::Repeated(values) => match self.slots.entry(tag) {
                    Entry::Occupied(mut entry) => match entry.get_mut() {
                        Slot::Repeated(mine) => mine.extend(values),
                        mine @ Slot::Single(_) => *mine = Slot::Repeated(values),
                    },
                    Entry::Vacant(entry) => {
                        entry.insert(Slot::Repeated(values));
                    }
                },
                Slot::Single(Value::Message(theirs)) => match self.slots.get_mut(&tag) {
                    Some(Slot::Single(Value::Message(mine))) => mine.absorb(theirs),
                    _ => {
                        self.slots.insert(tag, Slot::Single(Value::Message(theirs)));
                    }
                },
                single @ Slot::Single(_) => {
                    self.slots.insert(tag, single);
                }
            }
        }
        self.unknown.extend_from(other.unknown);
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.message_name() == other.message_name()
            && self.slots == other.slots
            && self.unknown == other.unknown
    }
}

impl Debug for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("message", &self.message_name())
            .field("fields", &self.slots)
            .field("unknown", &self.unknown)
            .finish()
    }
}

#[cfg(feature = "serde_impls")]
mod serde_impls {
    use serde::ser::{Serialize, SerializeMap, Serializer};

    use super::{Record, Slot};

    /// Serializes the set fields by name, in declaration order; unknown
    /// fields are left out.
    impl Serialize for Record {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.slots.len()))?;
            for field in self.descriptor.fields() {
                match self.slots.get(&field.tag()) {
                    Some(Slot::Single(value)) => map.serialize_entry(field.name(), value)?,
                    Some(Slot::Repeated(values)) => map.serialize_entry(field.name(), values)?,
                    None => {}
                }
            }
            map.end()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::registry::fixtures::{self, BOOK, PERSON, PHONE};

    fn person(registry: &Arc<Registry>, name: &str, id: i32) -> Record {
        let mut person = Record::new(registry, PERSON).unwrap();
        person.set(1, Value::from(name)).unwrap();
        person.set(2, Value::Int32(id)).unwrap();
        person
    }

    #[test]
    fn unknown_message() {
        let registry = fixtures::address_book();
        assert_eq!(
            Record::new(&registry, "tutorial.Nobody"),
            Err(RecordError::UnknownMessage("tutorial.Nobody".into()))
        );
    }

    #[test]
    fn set_and_get() {
        let registry = fixtures::address_book();
        let mut person = Record::new(&registry, PERSON).unwrap();
        assert!(!person.is_set(2));
        assert_eq!(person.get(2).unwrap().into_owned(), Value::Int32(0));

        // the zero value is still a present value
        person.set(2, Value::Int32(0)).unwrap();
        assert!(person.is_set(2));

        person.set(1, Value::from("Ann")).unwrap();
        assert_eq!(person.get(1).unwrap().as_str(), Some("Ann"));
        person.clear(1).unwrap();
        assert!(!person.is_set(1));
        assert_eq!(person.get(1).unwrap().as_str(), Some(""));
    }

    #[test]
    fn set_rejects_misuse() {
        let registry = fixtures::address_book();
        let mut person = Record::new(&registry, PERSON).unwrap();
        assert_eq!(
            person.set(9, Value::Int32(1)),
            Err(RecordError::UnknownField {
                message: PERSON.into(),
                tag: 9
            })
        );
        assert!(matches!(
            person.set(2, Value::Int64(1)),
            Err(RecordError::TypeMismatch { .. })
        ));
        assert!(matches!(
            person.set(4, Value::from("x")),
            Err(RecordError::Cardinality { hint: "append", .. })
        ));
        assert!(matches!(
            person.append(1, Value::from("x")),
            Err(RecordError::Cardinality { hint: "set", .. })
        ));
        assert_eq!(person.clear(9).map_err(|_| ()), Err(()));
        assert!(person.is_empty());
    }

    #[test]
    fn enum_values_are_checked() {
        let registry = fixtures::address_book();
        let mut phone = Record::new(&registry, PHONE).unwrap();
        assert_eq!(phone.get(2).unwrap().into_owned(), Value::Enum(1));
        phone.set(2, Value::Enum(2)).unwrap();
        assert!(matches!(
            phone.set(2, Value::Enum(3)),
            Err(RecordError::TypeMismatch { .. })
        ));
        assert_eq!(phone.get(2).unwrap().into_owned(), Value::Enum(2));
    }

    #[test]
    fn message_values_are_checked() {
        let registry = fixtures::address_book();
        let mut book = Record::new(&registry, BOOK).unwrap();
        let phone = Record::new(&registry, PHONE).unwrap();
        assert!(matches!(
            book.append(1, Value::Message(phone)),
            Err(RecordError::TypeMismatch { .. })
        ));
        book.append(1, Value::Message(person(&registry, "Bo", 2)))
            .unwrap();
        assert_eq!(book.field_len(1).unwrap(), 1);
    }

    #[test]
    fn nested_access_creates_in_place() {
        let registry = fixtures::linked();
        let mut node = Record::new(&registry, "Node").unwrap();

        // reading does not attach anything
        assert!(node.get(2).unwrap().as_message().unwrap().is_empty());
        assert!(!node.is_set(2));

        let next = node.message_mut(2).unwrap();
        assert!(next.is_empty());
        assert!(node.is_set(2));

        node.message_mut(2).unwrap().set(1, Value::Int32(5)).unwrap();
        node.message_mut(2)
            .unwrap()
            .message_mut(2)
            .unwrap()
            .set(1, Value::Int32(6))
            .unwrap();
        let next = node.get(2).unwrap();
        let next = next.as_message().unwrap();
        assert_eq!(next.get(1).unwrap().as_i32(), Some(5));
        assert_eq!(
            next.get(2).unwrap().as_message().unwrap().get(1).unwrap().as_i32(),
            Some(6)
        );

        assert!(matches!(
            node.message_mut(1),
            Err(RecordError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn repeated_messages() {
        let registry = fixtures::address_book();
        let mut book = Record::new(&registry, BOOK).unwrap();
        book.add_message(1).unwrap().set(1, Value::from("Ann")).unwrap();
        book.add_message(1).unwrap().set(1, Value::from("Bo")).unwrap();
        assert_eq!(book.field_len(1).unwrap(), 2);

        book.repeated_message_mut(1, 1)
            .unwrap()
            .set(2, Value::Int32(2))
            .unwrap();
        assert_eq!(
            book.repeated_message_mut(1, 2).map(|_| ()),
            Err(RecordError::IndexOutOfRange {
                message: BOOK.into(),
                field: "people".into(),
                index: 2,
                len: 2,
            })
        );
        let people = book.get_repeated(1).unwrap();
        assert_eq!(people[1].as_message().unwrap().get(2).unwrap().as_i32(), Some(2));
        assert!(matches!(
            book.get(1),
            Err(RecordError::Cardinality { hint: "get_repeated", .. })
        ));
    }

    #[test]
    fn required_paths() {
        let registry = fixtures::address_book();
        let empty = Record::new(&registry, PERSON).unwrap();
        assert_eq!(
            empty.validate_required(),
            BTreeSet::from(["id".to_owned(), "name".to_owned()])
        );

        let mut book = Record::new(&registry, BOOK).unwrap();
        assert!(book.is_initialized());
        book.append(1, Value::Message(person(&registry, "Ann", 1)))
            .unwrap();
        let bo = book.add_message(1).unwrap();
        bo.set(1, Value::from("Bo")).unwrap();
        bo.add_message(4).unwrap();
        bo.add_message(4)
            .unwrap()
            .set(1, Value::from("555"))
            .unwrap();
        assert_eq!(
            book.validate_required(),
            BTreeSet::from(["people[1].id".to_owned(), "people[1].phones[0].number".to_owned()])
        );
    }

    #[test]
    fn merge() {
        let registry = fixtures::linked();
        let mut a = Record::new(&registry, "Node").unwrap();
        a.set(1, Value::Int32(1)).unwrap();
        a.message_mut(2).unwrap().set(1, Value::Int32(10)).unwrap();
        a.add_message(3).unwrap();

        let mut b = Record::new(&registry, "Node").unwrap();
        b.set(1, Value::Int32(2)).unwrap();
        b.message_mut(2).unwrap().message_mut(2).unwrap();
        b.add_message(3).unwrap().set(1, Value::Int32(3)).unwrap();

        a.merge_from(&b).unwrap();
        assert_eq!(a.get(1).unwrap().as_i32(), Some(2));
        assert_eq!(a.field_len(3).unwrap(), 2);
        let next = a.get(2).unwrap();
        let next = next.as_message().unwrap();
        assert_eq!(next.get(1).unwrap().as_i32(), Some(10));
        assert!(next.is_set(2));

        let other = Record::new(&fixtures::address_book(), PERSON).unwrap();
        assert!(matches!(
            a.merge_from(&other),
            Err(RecordError::MessageMismatch { .. })
        ));
    }
}
