// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record set identity: the `(owner, zone, type)` key and its string identifier.
//!
//! A record set is stored in local state under an opaque identifier of the form
//! `owner:zone:type`. Each component is percent-escaped before joining (`%` becomes
//! `%25`, `:` becomes `%3A`), so the encoding is injective even for names that contain
//! the delimiter. Names without either character encode exactly as the plain
//! `owner:zone:type` form.
//!
//! # Example
//!
//! ```rust
//! use rrstate::record_key::{decode, RecordKey};
//!
//! let key = RecordKey::new("www", "example.com.", "A");
//! let id = key.identifier();
//! assert_eq!(id.as_str(), "www:example.com.:A");
//!
//! let decoded = decode(id.as_str()).unwrap();
//! assert_eq!(decoded, key);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::constants::{
    ESCAPED_DELIMITER, ESCAPED_PERCENT, IDENTIFIER_DELIMITER, IDENTIFIER_PART_COUNT,
};
use crate::errors::MalformedIdentifier;
use crate::normalize::{canonical_type, short_type, type_identity, types_equal};

/// Natural key of one record set at the provider.
///
/// Equality and hashing compare `record_type` with [`types_equal`], so a key holding
/// `"A"` equals one holding `"A (1)"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordKey {
    /// Owner name, zone-relative (`www`) or fully qualified (`www.example.com.`)
    pub owner: String,
    /// Zone name, fully qualified with a trailing dot
    pub zone: String,
    /// Record type, short (`A`) or canonical (`A (1)`)
    pub record_type: String,
}

impl RecordKey {
    /// Create a key from its three components.
    #[must_use]
    pub fn new(
        owner: impl Into<String>,
        zone: impl Into<String>,
        record_type: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            zone: zone.into(),
            record_type: record_type.into(),
        }
    }

    /// Encode this key into its durable identifier.
    #[must_use]
    pub fn identifier(&self) -> RecordIdentifier {
        encode(self)
    }

    /// The record type in the canonical form used by the provider.
    #[must_use]
    pub fn canonical_type(&self) -> String {
        canonical_type(&self.record_type)
    }

    /// The record type in its short display form, as used in API paths.
    #[must_use]
    pub fn short_type(&self) -> String {
        short_type(&self.record_type)
    }
}

impl PartialEq for RecordKey {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
            && self.zone == other.zone
            && types_equal(&self.record_type, &other.record_type)
    }
}

impl Eq for RecordKey {}

impl Hash for RecordKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.zone.hash(state);
        type_identity(&self.record_type).hash(state);
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.owner, self.zone, self.record_type)
    }
}

/// Opaque durable handle of a record set in local state.
///
/// Only produced by [`encode`], or restored verbatim from persisted state with
/// [`RecordIdentifier::from_raw`]. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordIdentifier(String);

impl RecordIdentifier {
    /// Wrap an identifier string loaded from persisted state.
    ///
    /// The value is not validated here; [`decode`] reports malformed identifiers when
    /// the identifier is next used.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode this identifier back into a record key.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedIdentifier`] if the identifier is not a valid encoding.
    pub fn decode(&self) -> Result<RecordKey, MalformedIdentifier> {
        decode(&self.0)
    }
}

impl fmt::Display for RecordIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode a record key as `owner:zone:type`, escaping each component.
#[must_use]
pub fn encode(key: &RecordKey) -> RecordIdentifier {
    let parts = [
        escape_component(&key.owner),
        escape_component(&key.zone),
        escape_component(&key.record_type),
    ];
    RecordIdentifier(parts.join(&IDENTIFIER_DELIMITER.to_string()))
}

/// Decode an identifier produced by [`encode`].
///
/// The type component is normalized to its short display form, so identifiers holding
/// either `A` or `A (1)` decode to equal keys.
///
/// # Errors
///
/// Returns [`MalformedIdentifier`] when the identifier does not split into exactly
/// three parts, when a part is empty, or when a part contains an invalid escape.
pub fn decode(identifier: &str) -> Result<RecordKey, MalformedIdentifier> {
    let parts: Vec<&str> = identifier.split(IDENTIFIER_DELIMITER).collect();

    if parts.len() != IDENTIFIER_PART_COUNT {
        return Err(MalformedIdentifier {
            identifier: identifier.to_string(),
            reason: format!(
                "expected {IDENTIFIER_PART_COUNT} parts separated by '{IDENTIFIER_DELIMITER}', found {}",
                parts.len()
            ),
        });
    }

    if let Some(index) = parts.iter().position(|p| p.is_empty()) {
        return Err(MalformedIdentifier {
            identifier: identifier.to_string(),
            reason: format!("part {} is empty", index + 1),
        });
    }

    let owner = unescape_component(parts[0], identifier)?;
    let zone = unescape_component(parts[1], identifier)?;
    let record_type = unescape_component(parts[2], identifier)?;

    Ok(RecordKey {
        owner,
        zone,
        record_type: short_type(&record_type),
    })
}

fn escape_component(component: &str) -> Cow<'_, str> {
    if !component.contains(['%', IDENTIFIER_DELIMITER]) {
        return Cow::Borrowed(component);
    }

    let mut escaped = String::with_capacity(component.len() + 4);
    for c in component.chars() {
        match c {
            '%' => escaped.push_str(ESCAPED_PERCENT),
            IDENTIFIER_DELIMITER => escaped.push_str(ESCAPED_DELIMITER),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

fn unescape_component(component: &str, identifier: &str) -> Result<String, MalformedIdentifier> {
    let mut unescaped = String::with_capacity(component.len());
    let mut rest = component;

    while let Some(pos) = rest.find('%') {
        unescaped.push_str(&rest[..pos]);

        let sequence = rest.get(pos..pos + 3).unwrap_or(&rest[pos..]);
        if sequence.eq_ignore_ascii_case(ESCAPED_PERCENT) {
            unescaped.push('%');
        } else if sequence.eq_ignore_ascii_case(ESCAPED_DELIMITER) {
            unescaped.push(IDENTIFIER_DELIMITER);
        } else {
            return Err(MalformedIdentifier {
                identifier: identifier.to_string(),
                reason: format!("invalid escape sequence '{sequence}'"),
            });
        }

        rest = &rest[pos + sequence.len()..];
    }

    unescaped.push_str(rest);
    Ok(unescaped)
}

#[cfg(test)]
#[path = "record_key_tests.rs"]
mod record_key_tests;
