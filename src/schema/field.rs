//! Field descriptors
//!
//! A [`FieldDescriptor`] is the static description of one field of a message
//! type: its tag, name, cardinality, logical value kind, and optional default.
//! The wire kind of a field is never stated separately; it is a pure function
//! of the value kind (see [`ValueKind::wire_kind`]).
//!
//! Descriptors are plain values until they are handed to
//! [`MessageDescriptor::describe`](crate::schema::message::MessageDescriptor::describe),
//! which validates them as a set and freezes them.

use std::fmt::{Display, Formatter};

use crate::value::Value;
use crate::wire::WireKind;

/// How many values a field may hold, and whether it must be present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Exactly one value, checked at the encode boundary
    Required,
    /// Zero or one value
    Optional,
    /// Zero or more values, in append order
    Repeated,
}

impl Display for Cardinality {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Cardinality::Required => "required",
            Cardinality::Optional => "optional",
            Cardinality::Repeated => "repeated",
        })
    }
}

/// Logical type of a field's values.
///
/// The schema is closed and known once the registry is built, so this is a
/// closed set of variants rather than an extension point. Enum and message
/// kinds name their target type, which is resolved through the
/// [`Registry`](crate::schema::registry::Registry).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    /// Zig-zag encoded `int32`
    SInt32,
    /// Zig-zag encoded `int64`
    SInt64,
    Bool,
    Enum(String),
    Fixed32,
    SFixed32,
    Float,
    Fixed64,
    SFixed64,
    Double,
    String,
    Bytes,
    Message(String),
}

impl ValueKind {
    /// Wire kind used for a single value of this kind
    #[must_use]
    pub const fn wire_kind(&self) -> WireKind {
        match self {
            ValueKind::Int32
            | ValueKind::Int64
            | ValueKind::UInt32
            | ValueKind::UInt64
            | ValueKind::SInt32
            | ValueKind::SInt64
            | ValueKind::Bool
            | ValueKind::Enum(_) => WireKind::Varint,
            ValueKind::Fixed32 | ValueKind::SFixed32 | ValueKind::Float => WireKind::Fixed32,
            ValueKind::Fixed64 | ValueKind::SFixed64 | ValueKind::Double => WireKind::Fixed64,
            ValueKind::String | ValueKind::Bytes | ValueKind::Message(_) => {
                WireKind::LengthDelimited
            }
        }
    }

    /// Whether repeated values of this kind may be packed into a single
    /// length-delimited unit.
    #[must_use]
    pub const fn is_packable(&self) -> bool {
        !matches!(self.wire_kind(), WireKind::LengthDelimited)
    }

    #[must_use]
    pub const fn is_message(&self) -> bool {
        matches!(self, ValueKind::Message(_))
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Int32 => f.write_str("int32"),
            ValueKind::Int64 => f.write_str("int64"),
            ValueKind::UInt32 => f.write_str("uint32"),
            ValueKind::UInt64 => f.write_str("uint64"),
            ValueKind::SInt32 => f.write_str("sint32"),
            ValueKind::SInt64 => f.write_str("sint64"),
            ValueKind::Bool => f.write_str("bool"),
            ValueKind::Enum(name) => write!(f, "enum {name}"),
            ValueKind::Fixed32 => f.write_str("fixed32"),
            ValueKind::SFixed32 => f.write_str("sfixed32"),
            ValueKind::Float => f.write_str("float"),
            ValueKind::Fixed64 => f.write_str("fixed64"),
            ValueKind::SFixed64 => f.write_str("sfixed64"),
            ValueKind::Double => f.write_str("double"),
            ValueKind::String => f.write_str("string"),
            ValueKind::Bytes => f.write_str("bytes"),
            ValueKind::Message(name) => write!(f, "message {name}"),
        }
    }
}

/// Static metadata for one field of a message type
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    tag: u32,
    cardinality: Cardinality,
    kind: ValueKind,
    default: Option<Value>,
    packed: bool,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, tag: u32, cardinality: Cardinality, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            tag,
            cardinality,
            kind,
            default: None,
            packed: false,
        }
    }

    #[must_use]
    pub fn required(name: impl Into<String>, tag: u32, kind: ValueKind) -> Self {
        Self::new(name, tag, Cardinality::Required, kind)
    }

    #[must_use]
    pub fn optional(name: impl Into<String>, tag: u32, kind: ValueKind) -> Self {
        Self::new(name, tag, Cardinality::Optional, kind)
    }

    #[must_use]
    pub fn repeated(name: impl Into<String>, tag: u32, kind: ValueKind) -> Self {
        Self::new(name, tag, Cardinality::Repeated, kind)
    }

    /// Sets an explicit default, returned by `get` while the field is unset.
    ///
    /// Legality (matching kind, singular non-message field) is checked when
    /// the owning message is described.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Requests the packed encoding for a repeated scalar field.
    #[must_use]
    pub fn packed(mut self) -> Self {
        self.packed = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub const fn tag(&self) -> u32 {
        self.tag
    }

    #[inline]
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &ValueKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub const fn wire_kind(&self) -> WireKind {
        self.kind.wire_kind()
    }

    /// The explicit default, if one was declared
    #[inline]
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn is_packed(&self) -> bool {
        self.packed
    }

    #[inline]
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.cardinality == Cardinality::Required
    }
}
