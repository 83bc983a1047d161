//! Field values
//!
//! [`Value`] is the closed set of things a field can hold. There is one
//! variant per [`ValueKind`], so that the kind check performed on every
//! `set`/`append` is a plain match rather than a dynamic type test.

use crate::record::Record;
use crate::schema::field::ValueKind;

/// A single field value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    SInt32(i32),
    SInt64(i64),
    Bool(bool),
    /// Number of an enum value; membership in the enum is checked on `set`
    Enum(i32),
    Fixed32(u32),
    SFixed32(i32),
    Float(f32),
    Fixed64(u64),
    SFixed64(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Nested record, owned by the record holding this value
    Message(Record),
}

impl Value {
    /// Short name of this value's kind, as used in error messages
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::UInt32(_) => "uint32",
            Value::UInt64(_) => "uint64",
            Value::SInt32(_) => "sint32",
            Value::SInt64(_) => "sint64",
            Value::Bool(_) => "bool",
            Value::Enum(_) => "enum",
            Value::Fixed32(_) => "fixed32",
            Value::SFixed32(_) => "sfixed32",
            Value::Float(_) => "float",
            Value::Fixed64(_) => "fixed64",
            Value::SFixed64(_) => "sfixed64",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Message(_) => "message",
        }
    }

    /// Whether this value may be stored in a field of the given kind.
    ///
    /// Enum values are only checked for being enum numbers here; whether the
    /// number is declared needs the registry and is checked by the record.
    #[must_use]
    pub fn is_of_kind(&self, kind: &ValueKind) -> bool {
        match (self, kind) {
            (Value::Int32(_), ValueKind::Int32)
            | (Value::Int64(_), ValueKind::Int64)
            | (Value::UInt32(_), ValueKind::UInt32)
            | (Value::UInt64(_), ValueKind::UInt64)
            | (Value::SInt32(_), ValueKind::SInt32)
            | (Value::SInt64(_), ValueKind::SInt64)
            | (Value::Bool(_), ValueKind::Bool)
            | (Value::Enum(_), ValueKind::Enum(_))
            | (Value::Fixed32(_), ValueKind::Fixed32)
            | (Value::SFixed32(_), ValueKind::SFixed32)
            | (Value::Float(_), ValueKind::Float)
            | (Value::Fixed64(_), ValueKind::Fixed64)
            | (Value::SFixed64(_), ValueKind::SFixed64)
            | (Value::Double(_), ValueKind::Double)
            | (Value::String(_), ValueKind::String)
            | (Value::Bytes(_), ValueKind::Bytes) => true,
            (Value::Message(record), ValueKind::Message(name)) => record.message_name() == name,
            _ => false,
        }
    }

    /// Describes this value for a kind-mismatch error
    pub(crate) fn describe_kind(&self) -> String {
        match self {
            Value::Message(record) => format!("message {}", record.message_name()),
            other => other.kind_name().to_owned(),
        }
    }

    /// Returns the value of any 32-bit signed variant (`int32`, `sint32`,
    /// `sfixed32`, `enum`)
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::Int32(v) | Value::SInt32(v) | Value::SFixed32(v) | Value::Enum(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value of any 64-bit signed variant
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int64(v) | Value::SInt64(v) | Value::SFixed64(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::UInt32(v) | Value::Fixed32(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::UInt64(v) | Value::Fixed64(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Double(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_message(&self) -> Option<&Record> {
        match self {
            Value::Message(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_message_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Message(r) => Some(r),
            _ => None,
        }
    }
}

macro_rules! impl_value_from {
    ($($src:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$src> for Value {
                fn from(val: $src) -> Self {
                    Value::$variant(val.into())
                }
            }
        )+
    };
}

impl_value_from! {
    i32 => Int32,
    i64 => Int64,
    u32 => UInt32,
    u64 => UInt64,
    bool => Bool,
    f32 => Float,
    f64 => Double,
    String => String,
    &str => String,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    Record => Message,
}

#[cfg(feature = "serde_impls")]
mod serde_impls {
    use serde::{Serialize, Serializer};

    use super::Value;

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::Int32(v) | Value::SInt32(v) | Value::SFixed32(v) | Value::Enum(v) => {
                    serializer.serialize_i32(*v)
                }
                Value::Int64(v) | Value::SInt64(v) | Value::SFixed64(v) => {
                    serializer.serialize_i64(*v)
                }
                Value::UInt32(v) | Value::Fixed32(v) => serializer.serialize_u32(*v),
                Value::UInt64(v) | Value::Fixed64(v) => serializer.serialize_u64(*v),
                Value::Bool(v) => serializer.serialize_bool(*v),
                Value::Float(v) => serializer.serialize_f32(*v),
                Value::Double(v) => serializer.serialize_f64(*v),
                Value::String(v) => serializer.serialize_str(v),
                Value::Bytes(v) => serializer.serialize_bytes(v),
                Value::Message(r) => r.serialize(serializer),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kind_checks() {
        assert!(Value::Int32(1).is_of_kind(&ValueKind::Int32));
        assert!(!Value::Int32(1).is_of_kind(&ValueKind::Int64));
        assert!(!Value::Int32(1).is_of_kind(&ValueKind::SInt32));
        assert!(Value::Enum(3).is_of_kind(&ValueKind::Enum("Any".into())));
        assert!(Value::from("x").is_of_kind(&ValueKind::String));
        assert!(!Value::from("x").is_of_kind(&ValueKind::Bytes));
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from(7i32), Value::Int32(7));
        assert_eq!(Value::from(7u64), Value::UInt64(7));
        assert_eq!(Value::from(&b"ab"[..]), Value::Bytes(vec![b'a', b'b']));
        assert_eq!(Value::Enum(2).as_i32(), Some(2));
        assert_eq!(Value::Fixed64(9).as_u64(), Some(9));
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert_eq!(Value::Bool(true).as_i32(), None);
    }
}
