// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Local state file.
//!
//! The state file maps resource names to the identifier of the managed record set
//! and the last known declaration. It is the only place identifiers are persisted.
//!
//! ```json
//! {
//!   "version": 1,
//!   "serial": 4,
//!   "updated_at": "2025-06-01T12:00:00Z",
//!   "resources": {
//!     "web": {
//!       "id": "www:example.com.:A",
//!       "record": { "zone_name": "example.com.", "owner_name": "www", ... }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::STATE_FORMAT_VERSION;
use crate::errors::StateError;
use crate::record::DeclaredRecord;
use crate::record_key::RecordIdentifier;

/// One managed record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    /// Identifier returned by create
    pub id: RecordIdentifier,
    /// Declaration as last realigned with the provider
    pub record: DeclaredRecord,
}

/// Contents of the state file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    /// Format version
    pub version: u32,
    /// Incremented on every save
    #[serde(default)]
    pub serial: u64,
    /// Time of the last save
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Managed record sets by resource name
    #[serde(default)]
    pub resources: BTreeMap<String, StateEntry>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_FORMAT_VERSION,
            serial: 0,
            updated_at: None,
            resources: BTreeMap::new(),
        }
    }
}

impl StateFile {
    /// Load the state file; a missing file yields empty state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the file cannot be read or parsed, or was written in
    /// a newer format.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StateError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No state file, starting empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let state: Self = serde_json::from_str(&content).map_err(|e| StateError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        if state.version > STATE_FORMAT_VERSION {
            return Err(StateError::UnsupportedVersion {
                path: path.display().to_string(),
                version: state.version,
            });
        }

        debug!(
            path = %path.display(),
            serial = state.serial,
            resources = state.resources.len(),
            "Loaded state file"
        );
        Ok(state)
    }

    /// Write the state file atomically, bumping the serial.
    ///
    /// The content is written to a sibling temporary file and renamed over the target.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Write`] if writing or renaming fails.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), StateError> {
        let path = path.as_ref();
        self.version = STATE_FORMAT_VERSION;
        self.serial += 1;
        self.updated_at = Some(Utc::now());

        let write_error = |source| StateError::Write {
            path: path.display().to_string(),
            source,
        };

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| write_error(std::io::Error::other(e)))?;
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).map_err(write_error)?;
        std::fs::rename(&temp_path, path).map_err(write_error)?;

        debug!(path = %path.display(), serial = self.serial, "Saved state file");
        Ok(())
    }

    /// Look up a managed record set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StateEntry> {
        self.resources.get(name)
    }

    /// Record a managed record set, replacing any previous entry.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        id: RecordIdentifier,
        record: DeclaredRecord,
    ) {
        self.resources.insert(name.into(), StateEntry { id, record });
    }

    /// Forget a managed record set.
    pub fn remove(&mut self, name: &str) -> Option<StateEntry> {
        self.resources.remove(name)
    }

    /// Resource names in state, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod state_tests;
