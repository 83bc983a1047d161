//! Message descriptors

use std::collections::{BTreeMap, HashMap};

use crate::error::SchemaError;
use crate::schema::field::{FieldDescriptor, ValueKind};
use crate::wire::{MAX_TAG, MIN_TAG, RESERVED_TAGS};

/// Static description of a message type.
///
/// Holds the fields in declaration order, which is used only for display;
/// the encoder always walks fields in ascending tag order. A descriptor is
/// immutable once built and is shared, behind an `Arc`, by every record of
/// its type.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
    by_tag: BTreeMap<u32, usize>,
}

impl MessageDescriptor {
    /// Validates a set of field declarations and freezes them as a message type.
    ///
    /// # Errors
    ///
    /// Fails with a [`SchemaError`] if any tag is zero, above
    /// [`MAX_TAG`], or in the reserved range; if a tag or field name is
    /// declared twice; if a default is given for a repeated or message field
    /// or does not match the field's kind; or if `packed` is requested on
    /// anything but a repeated scalar field.
    ///
    /// Whether enum and message references resolve is only known once every
    /// type is declared, and is checked by
    /// [`RegistryBuilder::build`](crate::schema::registry::RegistryBuilder::build).
    pub fn describe(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let fields: Vec<FieldDescriptor> = fields.into_iter().collect();
        let mut by_tag: BTreeMap<u32, usize> = BTreeMap::new();
        let mut by_name: HashMap<&str, usize> = HashMap::new();

        for (ix, field) in fields.iter().enumerate() {
            let tag = field.tag();
            if tag < MIN_TAG {
                return Err(SchemaError::NonPositiveTag {
                    message: name,
                    field: field.name().to_owned(),
                    tag,
                });
            }
            if tag > MAX_TAG {
                return Err(SchemaError::TagTooLarge {
                    message: name,
                    field: field.name().to_owned(),
                    tag,
                    max: MAX_TAG,
                });
            }
            if RESERVED_TAGS.contains(&tag) {
                return Err(SchemaError::ReservedTag {
                    message: name,
                    field: field.name().to_owned(),
                    tag,
                });
            }
            if let Some(&prev) = by_tag.get(&tag) {
                return Err(SchemaError::DuplicateTag {
                    message: name,
                    tag,
                    first: fields[prev].name().to_owned(),
                    second: field.name().to_owned(),
                });
            }
            if by_name.insert(field.name(), ix).is_some() {
                return Err(SchemaError::DuplicateFieldName {
                    message: name,
                    field: field.name().to_owned(),
                });
            }
            check_default(&name, field)?;
            check_packed(&name, field)?;
            by_tag.insert(tag, ix);
        }

        Ok(Self {
            name,
            fields,
            by_tag,
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, tag: u32) -> Option<&FieldDescriptor> {
        self.by_tag.get(&tag).map(|&ix| &self.fields[ix])
    }

    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Declared tags in ascending order
    pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_tag.keys().copied()
    }
}

fn check_default(message: &str, field: &FieldDescriptor) -> Result<(), SchemaError> {
    let Some(default) = field.default_value() else {
        return Ok(());
    };
    if field.is_repeated() {
        return Err(SchemaError::IllegalDefault {
            message: message.to_owned(),
            field: field.name().to_owned(),
            reason: "repeated fields default to empty",
        });
    }
    if field.kind().is_message() {
        return Err(SchemaError::IllegalDefault {
            message: message.to_owned(),
            field: field.name().to_owned(),
            reason: "message fields default to an empty record",
        });
    }
    if !default.is_of_kind(field.kind()) {
        return Err(SchemaError::DefaultKindMismatch {
            message: message.to_owned(),
            field: field.name().to_owned(),
            expected: field.kind().to_string(),
            actual: default.kind_name().to_owned(),
        });
    }
    Ok(())
}

fn check_packed(message: &str, field: &FieldDescriptor) -> Result<(), SchemaError> {
    if !field.is_packed() {
        return Ok(());
    }
    let reason = if !field.is_repeated() {
        "only repeated fields can be packed"
    } else if !field.kind().is_packable() {
        "length-delimited kinds cannot be packed"
    } else {
        return Ok(());
    };
    Err(SchemaError::IllegalPacked {
        message: message.to_owned(),
        field: field.name().to_owned(),
        reason,
    })
}

/// Whether a kind names another declared type
pub(crate) fn reference_of(kind: &ValueKind) -> Option<(&'static str, &str)> {
    match kind {
        ValueKind::Enum(target) => Some(("enum", target)),
        ValueKind::Message(target) => Some(("message", target)),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::Value;

    fn person() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::required("name", 1, ValueKind::String),
            FieldDescriptor::required("id", 2, ValueKind::Int32),
            FieldDescriptor::optional("email", 3, ValueKind::String),
        ]
    }

    #[test]
    fn lookup_by_tag_and_name() {
        let desc = MessageDescriptor::describe("Person", person()).unwrap();
        assert_eq!(desc.name(), "Person");
        assert_eq!(desc.field(2).map(FieldDescriptor::name), Some("id"));
        assert_eq!(desc.field(4), None);
        assert_eq!(desc.field_by_name("email").map(FieldDescriptor::tag), Some(3));
        assert_eq!(desc.tags().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn declaration_order_is_kept() {
        let desc = MessageDescriptor::describe(
            "M",
            [
                FieldDescriptor::optional("z", 9, ValueKind::Bool),
                FieldDescriptor::optional("a", 1, ValueKind::Bool),
            ],
        )
        .unwrap();
        let names: Vec<&str> = desc.fields().iter().map(FieldDescriptor::name).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(desc.tags().collect::<Vec<_>>(), vec![1, 9]);
    }

    #[test]
    fn rejects_duplicate_tag() {
        let mut fields = person();
        fields.push(FieldDescriptor::optional("alias", 1, ValueKind::String));
        assert_eq!(
            MessageDescriptor::describe("Person", fields),
            Err(SchemaError::DuplicateTag {
                message: "Person".into(),
                tag: 1,
                first: "name".into(),
                second: "alias".into(),
            })
        );
    }

    #[test]
    fn rejects_bad_tags() {
        assert!(matches!(
            MessageDescriptor::describe("M", [FieldDescriptor::optional("x", 0, ValueKind::Bool)]),
            Err(SchemaError::NonPositiveTag { tag: 0, .. })
        ));
        assert!(matches!(
            MessageDescriptor::describe(
                "M",
                [FieldDescriptor::optional("x", MAX_TAG + 1, ValueKind::Bool)]
            ),
            Err(SchemaError::TagTooLarge { .. })
        ));
        assert!(matches!(
            MessageDescriptor::describe("M", [FieldDescriptor::optional("x", 19_500, ValueKind::Bool)]),
            Err(SchemaError::ReservedTag { .. })
        ));
        assert!(MessageDescriptor::describe("M", [FieldDescriptor::optional("x", MAX_TAG, ValueKind::Bool)]).is_ok());
    }

    #[test]
    fn rejects_duplicate_name() {
        assert!(matches!(
            MessageDescriptor::describe(
                "M",
                [
                    FieldDescriptor::optional("x", 1, ValueKind::Bool),
                    FieldDescriptor::optional("x", 2, ValueKind::Bool),
                ]
            ),
            Err(SchemaError::DuplicateFieldName { .. })
        ));
    }

    #[test]
    fn checks_defaults() {
        assert!(MessageDescriptor::describe(
            "M",
            [FieldDescriptor::optional("x", 1, ValueKind::Int64).with_default(Value::Int64(-4))]
        )
        .is_ok());
        assert!(matches!(
            MessageDescriptor::describe(
                "M",
                [FieldDescriptor::optional("x", 1, ValueKind::Int64).with_default(Value::Int32(4))]
            ),
            Err(SchemaError::DefaultKindMismatch { .. })
        ));
        assert!(matches!(
            MessageDescriptor::describe(
                "M",
                [FieldDescriptor::repeated("x", 1, ValueKind::Int32).with_default(4)]
            ),
            Err(SchemaError::IllegalDefault { .. })
        ));
    }

    #[test]
    fn checks_packed() {
        assert!(MessageDescriptor::describe(
            "M",
            [FieldDescriptor::repeated("x", 1, ValueKind::Fixed32).packed()]
        )
        .is_ok());
        assert!(matches!(
            MessageDescriptor::describe(
                "M",
                [FieldDescriptor::optional("x", 1, ValueKind::Int32).packed()]
            ),
            Err(SchemaError::IllegalPacked { .. })
        ));
        assert!(matches!(
            MessageDescriptor::describe(
                "M",
                [FieldDescriptor::repeated("x", 1, ValueKind::String).packed()]
            ),
            Err(SchemaError::IllegalPacked { .. })
        ));
    }
}
