//! The address-book schema
//!
//! ```text
//! message AddressBook { repeated Person people = 1; }
//! message Person {
//!   required string name = 1;
//!   required int32 id = 2;
//!   optional string email = 3;
//!   repeated PhoneNumber phones = 4;
//!   enum PhoneType { MOBILE = 0; HOME = 1; WORK = 2; }
//!   message PhoneNumber {
//!     required string number = 1;
//!     optional PhoneType type = 2 [default = HOME];
//!   }
//! }
//! ```
//!
//! This is the schema the `addressbook` binary reads and writes. It is also a
//! compact example of every kind of field a schema can hold.

use std::sync::Arc;

use crate::error::SchemaError;
use crate::schema::enums::EnumDescriptor;
use crate::schema::field::{FieldDescriptor, ValueKind};
use crate::schema::message::MessageDescriptor;
use crate::schema::registry::Registry;
use crate::value::Value;

pub const BOOK: &str = "tutorial.AddressBook";
pub const PERSON: &str = "tutorial.Person";
pub const PHONE: &str = "tutorial.Person.PhoneNumber";
pub const PHONE_TYPE: &str = "tutorial.Person.PhoneType";

pub const BOOK_PEOPLE: u32 = 1;

pub const PERSON_NAME: u32 = 1;
pub const PERSON_ID: u32 = 2;
pub const PERSON_EMAIL: u32 = 3;
pub const PERSON_PHONES: u32 = 4;

pub const PHONE_NUMBER: u32 = 1;
pub const PHONE_KIND: u32 = 2;

/// `PhoneType` numbers, in declaration order
pub const MOBILE: i32 = 0;
pub const HOME: i32 = 1;
pub const WORK: i32 = 2;

/// Builds the address-book registry.
///
/// # Errors
///
/// Never fails in practice; the error is that of [`Registry::builder`].
pub fn registry() -> Result<Arc<Registry>, SchemaError> {
    Registry::builder()
        .enumeration(EnumDescriptor::describe(
            PHONE_TYPE,
            [("MOBILE", MOBILE), ("HOME", HOME), ("WORK", WORK)],
        )?)
        .message(MessageDescriptor::describe(
            PHONE,
            [
                FieldDescriptor::required("number", PHONE_NUMBER, ValueKind::String),
                FieldDescriptor::optional("type", PHONE_KIND, ValueKind::Enum(PHONE_TYPE.into()))
                    .with_default(Value::Enum(HOME)),
            ],
        )?)
        .message(MessageDescriptor::describe(
            PERSON,
            [
                FieldDescriptor::required("name", PERSON_NAME, ValueKind::String),
                FieldDescriptor::required("id", PERSON_ID, ValueKind::Int32),
                FieldDescriptor::optional("email", PERSON_EMAIL, ValueKind::String),
                FieldDescriptor::repeated("phones", PERSON_PHONES, ValueKind::Message(PHONE.into())),
            ],
        )?)
        .message(MessageDescriptor::describe(
            BOOK,
            [FieldDescriptor::repeated(
                "people",
                BOOK_PEOPLE,
                ValueKind::Message(PERSON.into()),
            )],
        )?)
        .build()
}
