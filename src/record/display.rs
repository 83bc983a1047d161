//! Text dump of records
//!
//! Fields are printed in declaration order, one `name: value` line per value,
//! with nested records in indented braces. Enum values print by name when the
//! number is declared. Unknown fields come last, listed by tag.

use std::fmt::{Display, Formatter, Result};

use super::{Record, Slot};
use crate::schema::field::{FieldDescriptor, ValueKind};
use crate::value::Value;

const INDENT: &str = "  ";

impl Record {
    fn fmt_body(&self, f: &mut Formatter<'_>, depth: usize) -> Result {
        for field in self.descriptor.fields() {
            match self.slots.get(&field.tag()) {
                Some(Slot::Single(value)) => self.fmt_value(f, depth, field, value)?,
                Some(Slot::Repeated(values)) => {
                    for value in values {
                        self.fmt_value(f, depth, field, value)?;
                    }
                }
                None => {}
            }
        }
        for unit in self.unknown.iter() {
            pad(f, depth)?;
            writeln!(
                f,
                "{}: <unknown {}, {} bytes>",
                unit.tag(),
                unit.wire_kind(),
                unit.raw().len()
            )?;
        }
        Ok(())
    }

    fn fmt_value(
        &self,
        f: &mut Formatter<'_>,
        depth: usize,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result {
        pad(f, depth)?;
        match value {
            Value::Message(nested) => {
                writeln!(f, "{} {{", field.name())?;
                nested.fmt_body(f, depth + 1)?;
                pad(f, depth)?;
                f.write_str("}\n")
            }
            Value::Enum(number) => {
                let name = match field.kind() {
                    ValueKind::Enum(target) => self
                        .registry
                        .enumeration(target)
                        .and_then(|desc| desc.value_name(*number)),
                    _ => None,
                };
                match name {
                    Some(name) => writeln!(f, "{}: {name}", field.name()),
                    None => writeln!(f, "{}: {number}", field.name()),
                }
            }
            Value::String(s) => writeln!(f, "{}: {s:?}", field.name()),
            Value::Bytes(b) => writeln!(f, "{}: \"{}\"", field.name(), b.escape_ascii()),
            Value::Int32(v) | Value::SInt32(v) | Value::SFixed32(v) => {
                writeln!(f, "{}: {v}", field.name())
            }
            Value::Int64(v) | Value::SInt64(v) | Value::SFixed64(v) => {
                writeln!(f, "{}: {v}", field.name())
            }
            Value::UInt32(v) | Value::Fixed32(v) => writeln!(f, "{}: {v}", field.name()),
            Value::UInt64(v) | Value::Fixed64(v) => writeln!(f, "{}: {v}", field.name()),
            Value::Bool(v) => writeln!(f, "{}: {v}", field.name()),
            Value::Float(v) => writeln!(f, "{}: {v}", field.name()),
            Value::Double(v) => writeln!(f, "{}: {v}", field.name()),
        }
    }
}

fn pad(f: &mut Formatter<'_>, depth: usize) -> Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        self.fmt_body(f, 0)
    }
}
