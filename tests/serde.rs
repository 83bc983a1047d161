#![cfg(feature = "serde_impls")]

mod common;

use protium::Record;
use serde_json::json;

use common::{add_person, address_book, BOOK};

#[test]
fn records_serialize_by_field_name() {
    let registry = address_book();
    let mut book = Record::new(&registry, BOOK).unwrap();
    add_person(&mut book, "Ann", 7, &[("555-0100", 2)]);

    assert_eq!(
        serde_json::to_value(&book).unwrap(),
        json!({
            "people": [
                { "name": "Ann", "id": 7, "phones": [{ "number": "555-0100", "type": 2 }] }
            ]
        })
    );
}
