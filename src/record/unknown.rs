//! Storage for field units a record's type does not declare
//!
//! Unknown units are kept verbatim, key included, so that re-encoding a
//! record reproduces them byte for byte. They are grouped by tag, and within
//! a tag kept in arrival order.

use std::collections::BTreeMap;

use crate::conv::target::Target;
use crate::wire::WireKind;

/// One field unit that was not recognized when it was decoded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownField {
    tag: u32,
    wire_kind: WireKind,
    raw: Vec<u8>,
}

impl UnknownField {
    /// `raw` must be the complete unit, starting with its key
    #[must_use]
    pub fn new(tag: u32, wire_kind: WireKind, raw: Vec<u8>) -> Self {
        Self { tag, wire_kind, raw }
    }

    #[must_use]
    pub fn tag(&self) -> u32 {
        self.tag
    }

    #[must_use]
    pub fn wire_kind(&self) -> WireKind {
        self.wire_kind
    }

    /// The unit's bytes, key included
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub(crate) fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_all(&self.raw)
    }
}

/// Ordered collection of [`UnknownField`]s
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnknownFieldSet {
    units: BTreeMap<u32, Vec<UnknownField>>,
}

impl UnknownFieldSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Total number of stored units, over all tags
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.values().map(Vec::len).sum()
    }

    /// Units stored under `tag`, in arrival order
    #[must_use]
    pub fn get(&self, tag: u32) -> &[UnknownField] {
        self.units.get(&tag).map_or(&[], Vec::as_slice)
    }

    /// Iterates over all units in ascending tag order
    pub fn iter(&self) -> impl Iterator<Item = &UnknownField> {
        self.units.values().flatten()
    }

    pub(crate) fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.units.keys().copied()
    }

    pub fn push(&mut self, field: UnknownField) {
        self.units.entry(field.tag).or_default().push(field);
    }

    /// Appends every unit of `other` after the units already held
    pub fn extend_from(&mut self, other: UnknownFieldSet) {
        for (tag, units) in other.units {
            self.units.entry(tag).or_default().extend(units);
        }
    }

    pub fn clear(&mut self) {
        self.units.clear();
    }

    pub(crate) fn write_tag_to<U: Target>(&self, tag: u32, buf: &mut U) -> usize {
        self.get(tag).iter().map(|unit| unit.write_to(buf)).sum()
    }
}
