// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record set data model.
//!
//! - [`DeclaredRecord`] is the locally declared desired state, loaded from the records
//!   file and kept in the state file.
//! - [`RRSet`], [`RRSetList`] and [`ResultInfo`] are the provider's wire format.
//! - [`ObservedRecord`] is the provider's current view of one record set, extracted
//!   from a read response, compared against the declaration and then discarded.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RECORD_TTL_SECS, LABEL_SEPARATOR};
use crate::errors::LifecycleError;
use crate::normalize::short_type;
use crate::record_key::RecordKey;

fn default_ttl() -> u32 {
    DEFAULT_RECORD_TTL_SECS
}

/// Desired state of one record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredRecord {
    /// Zone name, fully qualified (e.g. "example.com.")
    pub zone_name: String,
    /// Owner name, zone-relative ("www") or fully qualified ("www.example.com.")
    pub owner_name: String,
    /// Record type, short ("A") or canonical ("A (1)")
    pub record_type: String,
    /// Time to live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    /// Record data values; order and duplicates are not significant
    pub record_data: BTreeSet<String>,
}

impl DeclaredRecord {
    /// Create a declared record.
    #[must_use]
    pub fn new<I, S>(
        owner_name: impl Into<String>,
        zone_name: impl Into<String>,
        record_type: impl Into<String>,
        ttl: u32,
        record_data: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            zone_name: zone_name.into(),
            owner_name: owner_name.into(),
            record_type: record_type.into(),
            ttl,
            record_data: record_data.into_iter().map(Into::into).collect(),
        }
    }

    /// The natural key of this record set.
    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.owner_name, &self.zone_name, &self.record_type)
    }

    /// Request body for create and update calls.
    #[must_use]
    pub fn to_rrset(&self) -> RRSet {
        RRSet {
            owner_name: self.owner_name.clone(),
            rrtype: self.record_type.clone(),
            ttl: self.ttl,
            rdata: self.record_data.iter().cloned().collect(),
        }
    }

    /// Boundary validation performed before any remote call.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidRecord`] when the owner, zone or type is empty,
    /// when the zone is not fully qualified, or when there is no record data.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        let reason = if self.owner_name.trim().is_empty() {
            Some("owner name must not be empty")
        } else if self.zone_name.trim().is_empty() {
            Some("zone name must not be empty")
        } else if !self.zone_name.ends_with(LABEL_SEPARATOR) {
            Some("zone name must be fully qualified (end with '.')")
        } else if self.record_type.trim().is_empty() {
            Some("record type must not be empty")
        } else if self.record_data.is_empty() {
            Some("record data must contain at least one value")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(LifecycleError::InvalidRecord {
                owner: self.owner_name.clone(),
                zone: self.zone_name.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// One record set as exchanged with the provider API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RRSet {
    /// Owner name; the provider answers with the fully qualified form
    pub owner_name: String,
    /// Record type; the provider answers with the canonical form (e.g. "A (1)")
    pub rrtype: String,
    /// Time to live in seconds
    #[serde(default)]
    pub ttl: u32,
    /// Record data values
    #[serde(default)]
    pub rdata: Vec<String>,
}

/// Paging information attached to list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultInfo {
    /// Total number of matching record sets
    #[serde(default)]
    pub total_count: u64,
    /// Offset of the first returned record set
    #[serde(default)]
    pub offset: u64,
    /// Number of record sets in this response
    #[serde(default)]
    pub returned_count: u64,
}

/// Response of a record set read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RRSetList {
    /// Zone name as the provider spells it
    #[serde(default)]
    pub zone_name: String,
    /// Matching record sets
    #[serde(rename = "rrSets", default)]
    pub rrsets: Vec<RRSet>,
    /// Paging information
    #[serde(default)]
    pub result_info: Option<ResultInfo>,
}

impl RRSetList {
    /// Number of returned record sets, as reported by the provider.
    ///
    /// Falls back to the length of the list when the response has no paging block.
    #[must_use]
    pub fn returned_count(&self) -> u64 {
        self.result_info
            .as_ref()
            .map_or(self.rrsets.len() as u64, |info| info.returned_count)
    }

    /// True when the response describes no record set at all.
    ///
    /// A zero returned count or an empty list each mean absence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.returned_count() == 0 || self.rrsets.is_empty()
    }

    /// The first returned record set, or `None` when the response is empty.
    #[must_use]
    pub fn first_observed(&self) -> Option<ObservedRecord> {
        if self.is_empty() {
            return None;
        }
        self.rrsets
            .first()
            .map(|rrset| ObservedRecord::from_rrset(&self.zone_name, rrset))
    }
}

/// The provider's current view of one record set. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedRecord {
    /// Zone name as the provider spells it
    pub zone_name: String,
    /// Owner name as the provider spells it (usually fully qualified)
    pub owner_name: String,
    /// Record type in the provider's canonical form
    pub record_type: String,
    /// Time to live in seconds
    pub ttl: u32,
    /// Record data in the order the provider returned it
    pub record_data: Vec<String>,
}

impl ObservedRecord {
    /// Build an observed record from a wire record set and its zone.
    #[must_use]
    pub fn from_rrset(zone_name: &str, rrset: &RRSet) -> Self {
        Self {
            zone_name: zone_name.to_string(),
            owner_name: rrset.owner_name.clone(),
            record_type: rrset.rrtype.clone(),
            ttl: rrset.ttl,
            record_data: rrset.rdata.clone(),
        }
    }

    /// Record data as an unordered, duplicate-free set.
    #[must_use]
    pub fn data_set(&self) -> BTreeSet<String> {
        self.record_data.iter().cloned().collect()
    }

    /// Build a declaration that mirrors this record set exactly.
    ///
    /// Used when importing a record set that has no prior local state.
    #[must_use]
    pub fn to_declared(&self) -> DeclaredRecord {
        DeclaredRecord {
            zone_name: self.zone_name.clone(),
            owner_name: self.owner_name.clone(),
            record_type: short_type(&self.record_type),
            ttl: self.ttl,
            record_data: self.data_set(),
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod record_tests;
