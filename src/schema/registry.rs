//! Registry of declared types
//!
//! A [`Registry`] is populated once, through a [`RegistryBuilder`], and is
//! read-only from then on. It is passed explicitly (as an `Arc<Registry>`)
//! to everything that needs to resolve a type by name: record construction,
//! the decoder when it meets a nested message, and the display code when it
//! names enum values. There is no process-wide registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SchemaError;
use crate::schema::enums::EnumDescriptor;
use crate::schema::field::ValueKind;
use crate::schema::message::{reference_of, MessageDescriptor};
use crate::value::Value;

/// Collects descriptors before they are cross-checked and frozen
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    messages: Vec<MessageDescriptor>,
    enums: Vec<EnumDescriptor>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn message(mut self, desc: MessageDescriptor) -> Self {
        self.messages.push(desc);
        self
    }

    #[must_use]
    pub fn enumeration(mut self, desc: EnumDescriptor) -> Self {
        self.enums.push(desc);
        self
    }

    /// Cross-checks every declared type and freezes the registry.
    ///
    /// Message types may refer to themselves, or to each other in a cycle;
    /// records only ever form a tree, since each nested value is a fresh
    /// instance owned by its parent.
    ///
    /// # Errors
    ///
    /// Fails with [`SchemaError::DuplicateType`] if two types share a name
    /// (messages and enums share one namespace), with
    /// [`SchemaError::UnresolvedReference`] if a field names an undeclared
    /// type, and with [`SchemaError::DefaultKindMismatch`] if an enum field's
    /// default is not a value of its enum.
    pub fn build(self) -> Result<Arc<Registry>, SchemaError> {
        let mut messages: HashMap<String, Arc<MessageDescriptor>> = HashMap::new();
        let mut enums: HashMap<String, Arc<EnumDescriptor>> = HashMap::new();

        for desc in self.enums {
            if enums.contains_key(desc.name()) {
                return Err(SchemaError::DuplicateType(desc.name().to_owned()));
            }
            enums.insert(desc.name().to_owned(), Arc::new(desc));
        }
        for desc in self.messages {
            if messages.contains_key(desc.name()) || enums.contains_key(desc.name()) {
                return Err(SchemaError::DuplicateType(desc.name().to_owned()));
            }
            messages.insert(desc.name().to_owned(), Arc::new(desc));
        }

        for desc in messages.values() {
            for field in desc.fields() {
                if let Some((what, target)) = reference_of(field.kind()) {
                    let resolved = match field.kind() {
                        ValueKind::Enum(_) => enums.contains_key(target),
                        _ => messages.contains_key(target),
                    };
                    if !resolved {
                        return Err(SchemaError::UnresolvedReference {
                            message: desc.name().to_owned(),
                            field: field.name().to_owned(),
                            what,
                            target: target.to_owned(),
                        });
                    }
                }
                if let (ValueKind::Enum(target), Some(Value::Enum(number))) =
                    (field.kind(), field.default_value())
                {
                    let declared = enums.get(target).is_some_and(|e| e.contains(*number));
                    if !declared {
                        return Err(SchemaError::DefaultKindMismatch {
                            message: desc.name().to_owned(),
                            field: field.name().to_owned(),
                            expected: field.kind().to_string(),
                            actual: format!("undeclared value {number}"),
                        });
                    }
                }
            }
        }

        tracing::debug!(
            messages = messages.len(),
            enums = enums.len(),
            "schema registry built"
        );
        Ok(Arc::new(Registry { messages, enums }))
    }
}

/// Frozen set of message and enum types, keyed by name
#[derive(Debug)]
pub struct Registry {
    messages: HashMap<String, Arc<MessageDescriptor>>,
    enums: HashMap<String, Arc<EnumDescriptor>>,
}

impl Registry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    #[must_use]
    pub fn message(&self, name: &str) -> Option<&Arc<MessageDescriptor>> {
        self.messages.get(name)
    }

    #[must_use]
    pub fn enumeration(&self, name: &str) -> Option<&Arc<EnumDescriptor>> {
        self.enums.get(name)
    }

    /// Names of all declared message types, in no particular order
    pub fn message_names(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Schemas shared by the unit tests of several modules

    use super::*;
    use crate::schema::field::FieldDescriptor;

    pub(crate) use crate::tutorial::{BOOK, PERSON, PHONE, PHONE_TYPE};

    pub(crate) fn address_book() -> Arc<Registry> {
        crate::tutorial::registry().unwrap()
    }

    /// `Node { optional int32 value = 1; optional Node next = 2; repeated Node children = 3; }`
    pub(crate) fn linked() -> Arc<Registry> {
        Registry::builder()
            .message(
                MessageDescriptor::describe(
                    "Node",
                    [
                        FieldDescriptor::optional("value", 1, ValueKind::Int32),
                        FieldDescriptor::optional("next", 2, ValueKind::Message("Node".into())),
                        FieldDescriptor::repeated("children", 3, ValueKind::Message("Node".into())),
                    ],
                )
                .unwrap(),
            )
            .build()
            .unwrap()
    }
}
