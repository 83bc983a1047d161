#![allow(dead_code)]

use std::sync::Arc;

use protium::tutorial::{
    self, BOOK_PEOPLE, PERSON_ID, PERSON_NAME, PERSON_PHONES, PHONE_KIND, PHONE_NUMBER,
};
use protium::{FieldDescriptor, MessageDescriptor, Record, Registry, Value, ValueKind};

pub use protium::tutorial::{BOOK, PERSON, PHONE, PHONE_TYPE};

pub fn address_book() -> Arc<Registry> {
    tutorial::registry().unwrap()
}

/// `Node { optional int32 value = 1; optional Node next = 2; repeated Node children = 3; }`
pub fn linked() -> Arc<Registry> {
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

/// A chain of `depth` nodes below the returned one, linked through `next`,
/// each carrying its distance from the top as `value`
pub fn chain(registry: &Arc<Registry>, depth: usize) -> Record {
    let mut top = Record::new(registry, "Node").unwrap();
    let mut node = &mut top;
    for level in 0..depth {
        node.set(1, Value::Int32(level as i32)).unwrap();
        node = node.message_mut(2).unwrap();
    }
    node.set(1, Value::Int32(depth as i32)).unwrap();
    top
}

/// Appends a person with the given phones (number, type) to `book`
pub fn add_person(book: &mut Record, name: &str, id: i32, phones: &[(&str, i32)]) {
    let person = book.add_message(BOOK_PEOPLE).unwrap();
    person.set(PERSON_NAME, Value::from(name)).unwrap();
    person.set(PERSON_ID, Value::Int32(id)).unwrap();
    for (number, kind) in phones {
        let phone = person.add_message(PERSON_PHONES).unwrap();
        phone.set(PHONE_NUMBER, Value::from(*number)).unwrap();
        phone.set(PHONE_KIND, Value::Enum(*kind)).unwrap();
    }
}
