// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # rrstate - Declarative DNS Record Set Management
//!
//! rrstate keeps DNS record sets at a managed DNS provider in line with a declarative
//! records file, tracking what it manages in a local state file.
//!
//! ## Overview
//!
//! - Every managed record set has a stable identifier derived from its natural key
//!   `(owner, zone, type)`, so it can be addressed without any provider-side ID.
//! - The provider answers with fully qualified owners and canonical type strings
//!   (`"A (1)"`); those are recognized as equivalent to the declared spellings and
//!   never reported as drift.
//! - Real drift (TTL, data, and key fields that are not equivalent) is realigned
//!   into local state on every read.
//!
//! ## Modules
//!
//! - [`record_key`] - Record identifier encoding and decoding
//! - [`normalize`] - Owner and type equivalence rules
//! - [`record`] - Declared, observed and wire record set types
//! - [`reconciler`] - Drift detection between declared and observed record sets
//! - [`lifecycle`] - Create, read, update, delete, import and lookup
//! - [`api`] - Provider REST API client
//! - [`engine`] - Plan and apply against the state file
//!
//! ## Example
//!
//! ```rust
//! use rrstate::record::{DeclaredRecord, ObservedRecord};
//! use rrstate::reconciler::reconcile;
//!
//! let declared = DeclaredRecord::new("www", "example.com.", "A", 300, ["192.0.2.10"]);
//! let observed = ObservedRecord {
//!     zone_name: "example.com.".to_string(),
//!     owner_name: "www.example.com.".to_string(),
//!     record_type: "A (1)".to_string(),
//!     ttl: 300,
//!     record_data: vec!["192.0.2.10".to_string()],
//! };
//!
//! assert!(reconcile(&declared, &observed).is_empty());
//! assert_eq!(declared.key().identifier().as_str(), "www:example.com.:A");
//! ```

pub mod api;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod http_errors;
pub mod lifecycle;
pub mod metrics;
pub mod normalize;
pub mod reconciler;
pub mod record;
pub mod record_key;
pub mod retry;
pub mod state;

#[cfg(test)]
mod errors_tests;
#[cfg(test)]
mod test_support;
