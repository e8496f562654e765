// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Normalization rules for record types and owner names.
//!
//! The provider API reports record types in a canonical `"MNEMONIC (NUMBER)"` form
//! (for example `"A (1)"`) and owner names fully qualified, while declarations usually
//! carry the short mnemonic (`"A"`) and a zone-relative owner (`"www"`). The helpers
//! here decide when two such representations name the same thing.
//!
//! # Example
//!
//! ```rust
//! use rrstate::normalize::{canonical_type, owner_equivalent, short_type};
//!
//! assert_eq!(canonical_type("A"), "A (1)");
//! assert_eq!(short_type("CNAME (5)"), "CNAME");
//! assert!(owner_equivalent("www", "www.example.com.", "example.com."));
//! ```

use crate::constants::LABEL_SEPARATOR;

/// Record types known to the provider, as `(mnemonic, type number)`.
pub const KNOWN_RR_TYPES: &[(&str, u16)] = &[
    ("A", 1),
    ("NS", 2),
    ("CNAME", 5),
    ("SOA", 6),
    ("PTR", 12),
    ("HINFO", 13),
    ("MX", 15),
    ("TXT", 16),
    ("RP", 17),
    ("AAAA", 28),
    ("SRV", 33),
    ("NAPTR", 35),
    ("DS", 43),
    ("SSHFP", 44),
    ("TLSA", 52),
    ("SPF", 99),
    ("CAA", 257),
    ("APEXALIAS", 65282),
];

/// Resolve a type token (mnemonic, number, or canonical string) to a known entry.
fn lookup(token: &str) -> Option<(&'static str, u16)> {
    let token = token.trim();

    // "A (1)" - take the mnemonic and check the number agrees with it
    if let Some((mnemonic, number)) = split_canonical(token) {
        return KNOWN_RR_TYPES
            .iter()
            .copied()
            .find(|(m, n)| m.eq_ignore_ascii_case(mnemonic) && *n == number);
    }

    if let Ok(number) = token.parse::<u16>() {
        return KNOWN_RR_TYPES.iter().copied().find(|(_, n)| *n == number);
    }

    KNOWN_RR_TYPES
        .iter()
        .copied()
        .find(|(m, _)| m.eq_ignore_ascii_case(token))
}

/// Split `"MNEMONIC (N)"` into its parts. Returns `None` for any other shape.
fn split_canonical(token: &str) -> Option<(&str, u16)> {
    let inner = token.strip_suffix(')')?;
    let (mnemonic, number) = inner.rsplit_once(" (")?;
    let mnemonic = mnemonic.trim();
    if mnemonic.is_empty() {
        return None;
    }
    Some((mnemonic, number.parse().ok()?))
}

/// Map a record-type token to the canonical form used by the provider.
///
/// Known mnemonics (any ASCII case) and known type numbers map to `"MNEMONIC (N)"`.
/// Input that is already canonical is returned in the same form. Unknown tokens are
/// returned trimmed but otherwise unchanged, so the function is idempotent.
#[must_use]
pub fn canonical_type(input: &str) -> String {
    match lookup(input) {
        Some((mnemonic, number)) => format!("{mnemonic} ({number})"),
        None => input.trim().to_string(),
    }
}

/// Map a record-type token to its short display form (e.g. `"A (1)"` to `"A"`).
///
/// Unknown canonical strings lose their `" (N)"` suffix; any other unknown token is
/// returned trimmed.
#[must_use]
pub fn short_type(input: &str) -> String {
    if let Some((mnemonic, _)) = lookup(input) {
        return mnemonic.to_string();
    }

    let trimmed = input.trim();
    match split_canonical(trimmed) {
        Some((mnemonic, _)) => mnemonic.to_string(),
        None => trimmed.to_string(),
    }
}

/// Comparison key for a record-type token.
///
/// Known types compare by canonical form. Types missing from [`KNOWN_RR_TYPES`]
/// compare by their upper-cased mnemonic, so `"HTTPS"` and `"HTTPS (65)"` name the
/// same type.
#[must_use]
pub fn type_identity(input: &str) -> String {
    match lookup(input) {
        Some((mnemonic, number)) => format!("{mnemonic} ({number})"),
        None => short_type(input).to_ascii_uppercase(),
    }
}

/// Two type tokens are equal iff their [`type_identity`] keys are equal.
#[must_use]
pub fn types_equal(a: &str, b: &str) -> bool {
    type_identity(a) == type_identity(b)
}

/// Decide whether an observed owner name is the same name as the declared one.
///
/// True when the names are identical, or when the provider returned the fully
/// qualified form of a zone-relative declaration (`declared + "." + zone == observed`).
/// No case folding and no trailing-dot normalization is applied.
#[must_use]
pub fn owner_equivalent(declared: &str, observed: &str, zone: &str) -> bool {
    if declared == observed {
        return true;
    }

    // Compare piecewise to avoid allocating the joined name
    observed
        .strip_prefix(declared)
        .and_then(|rest| rest.strip_prefix(LABEL_SEPARATOR))
        .is_some_and(|rest| rest == zone)
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod normalize_tests;
