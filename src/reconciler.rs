// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Drift reconciliation between a declared record set and the provider's view of it.
//!
//! [`reconcile`] compares each field independently and returns the fields whose local
//! value must be realigned with the remote one. Representation differences that name
//! the same thing (a fully qualified owner, a canonical type string, reordered data)
//! are not drift and produce no change.
//!
//! | Field | Rule |
//! |-------|------|
//! | `zone_name` | refreshed from the provider |
//! | `owner_name` | refreshed unless [`owner_equivalent`] holds |
//! | `record_type` | refreshed (short form) unless the canonical forms match |
//! | `ttl` | refreshed from the provider |
//! | `record_data` | refreshed from the provider, compared as a set |
//!
//! A refresh with an equal value is a no-op and does not appear in the result.

use std::collections::BTreeSet;
use std::fmt;

use crate::normalize::{owner_equivalent, short_type, types_equal};
use crate::record::{DeclaredRecord, ObservedRecord};

/// A field of [`DeclaredRecord`] that reconciliation may rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordField {
    /// `zone_name`
    ZoneName,
    /// `owner_name`
    OwnerName,
    /// `record_type`
    RecordType,
    /// `ttl`
    Ttl,
    /// `record_data`
    RecordData,
}

impl RecordField {
    /// The field name as it appears in the records and state files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ZoneName => "zone_name",
            Self::OwnerName => "owner_name",
            Self::RecordType => "record_type",
            Self::Ttl => "ttl",
            Self::RecordData => "record_data",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New value for one drifted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    /// Zone name as the provider spells it
    ZoneName(String),
    /// Owner name as the provider spells it
    OwnerName(String),
    /// Record type in short display form
    RecordType(String),
    /// Time to live
    Ttl(u32),
    /// Record data set
    RecordData(BTreeSet<String>),
}

impl FieldChange {
    /// The field this change rewrites.
    #[must_use]
    pub fn field(&self) -> RecordField {
        match self {
            Self::ZoneName(_) => RecordField::ZoneName,
            Self::OwnerName(_) => RecordField::OwnerName,
            Self::RecordType(_) => RecordField::RecordType,
            Self::Ttl(_) => RecordField::Ttl,
            Self::RecordData(_) => RecordField::RecordData,
        }
    }

    /// Write the new value into a declared record.
    pub fn apply_to(&self, record: &mut DeclaredRecord) {
        match self {
            Self::ZoneName(zone) => record.zone_name.clone_from(zone),
            Self::OwnerName(owner) => record.owner_name.clone_from(owner),
            Self::RecordType(rrtype) => record.record_type.clone_from(rrtype),
            Self::Ttl(ttl) => record.ttl = *ttl,
            Self::RecordData(data) => record.record_data.clone_from(data),
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZoneName(v) | Self::OwnerName(v) | Self::RecordType(v) => {
                write!(f, "{}={v}", self.field())
            }
            Self::Ttl(ttl) => write!(f, "{}={ttl}", self.field()),
            Self::RecordData(data) => {
                let values: Vec<&str> = data.iter().map(String::as_str).collect();
                write!(f, "{}=[{}]", self.field(), values.join(", "))
            }
        }
    }
}

/// Set of field updates produced by [`reconcile`], in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordChanges {
    changes: Vec<FieldChange>,
}

impl RecordChanges {
    /// True when no field drifted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of drifted fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// The change for a field, if that field drifted.
    #[must_use]
    pub fn get(&self, field: RecordField) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field() == field)
    }

    /// Drifted fields, in field order.
    pub fn fields(&self) -> impl Iterator<Item = RecordField> + '_ {
        self.changes.iter().map(FieldChange::field)
    }

    /// Iterate over the changes.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldChange> {
        self.changes.iter()
    }

    /// Apply every change to a declared record.
    pub fn apply_to(&self, record: &mut DeclaredRecord) {
        for change in &self.changes {
            change.apply_to(record);
        }
    }
}

impl<'a> IntoIterator for &'a RecordChanges {
    type Item = &'a FieldChange;
    type IntoIter = std::slice::Iter<'a, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Compare a declared record with the provider's view and list the fields to update.
///
/// Pure: no I/O, inputs are not modified.
#[must_use]
pub fn reconcile(declared: &DeclaredRecord, observed: &ObservedRecord) -> RecordChanges {
    let mut changes = Vec::new();

    if declared.zone_name != observed.zone_name {
        changes.push(FieldChange::ZoneName(observed.zone_name.clone()));
    }

    // Keep the operator's zone-relative style when the provider returns the FQDN
    if !owner_equivalent(
        &declared.owner_name,
        &observed.owner_name,
        &observed.zone_name,
    ) {
        changes.push(FieldChange::OwnerName(observed.owner_name.clone()));
    }

    if !types_equal(&declared.record_type, &observed.record_type) {
        changes.push(FieldChange::RecordType(short_type(&observed.record_type)));
    }

    if declared.ttl != observed.ttl {
        changes.push(FieldChange::Ttl(observed.ttl));
    }

    let observed_data = observed.data_set();
    if declared.record_data != observed_data {
        changes.push(FieldChange::RecordData(observed_data));
    }

    RecordChanges { changes }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
