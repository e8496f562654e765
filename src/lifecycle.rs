// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record set lifecycle: create, read, update and delete against the provider.
//!
//! A record set moves between three states:
//!
//! - **absent** - no remote record set and no local identifier
//! - **present** - a local identifier exists and the last read found the record set
//! - **drifted** - a read found field differences and realigned local state; the
//!   record set is then present again
//!
//! ```text
//!            create                    read (changes)
//!   absent ──────────▶ present ◀───────────────────▶ drifted
//!      ▲                 │  │
//!      │ delete / read   │  │ update (+ confirming read)
//!      └─────────────────┘  └──────▶ present
//! ```
//!
//! The orchestrator receives its provider collaborator through [`RecordLifecycle::new`];
//! there is no process-wide client.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::api::ApiResponse;
use crate::errors::{ApiError, LifecycleError};
use crate::metrics::{record_drift, record_lifecycle_operation};
use crate::normalize::owner_equivalent;
use crate::reconciler::{reconcile, RecordChanges};
use crate::record::{DeclaredRecord, ObservedRecord, RRSet, RRSetList};
use crate::record_key::{encode, RecordIdentifier, RecordKey};

/// Provider operations on record sets.
///
/// `read_record` signals a missing record set either with an error for which
/// [`ApiError::is_not_found`] holds, or with an empty [`RRSetList`]. Callers must treat
/// both as absence. Retries, timeouts and authentication are the implementation's
/// concern.
#[async_trait]
pub trait RecordService: Send + Sync {
    /// Create a record set.
    async fn create_record(&self, key: &RecordKey, rrset: &RRSet)
        -> Result<ApiResponse, ApiError>;

    /// Read the record sets matching a key.
    async fn read_record(&self, key: &RecordKey) -> Result<RRSetList, ApiError>;

    /// Replace a record set.
    async fn update_record(&self, key: &RecordKey, rrset: &RRSet)
        -> Result<ApiResponse, ApiError>;

    /// Delete a record set.
    async fn delete_record(&self, key: &RecordKey) -> Result<ApiResponse, ApiError>;
}

#[async_trait]
impl<T: RecordService + ?Sized> RecordService for Arc<T> {
    async fn create_record(
        &self,
        key: &RecordKey,
        rrset: &RRSet,
    ) -> Result<ApiResponse, ApiError> {
        (**self).create_record(key, rrset).await
    }

    async fn read_record(&self, key: &RecordKey) -> Result<RRSetList, ApiError> {
        (**self).read_record(key).await
    }

    async fn update_record(
        &self,
        key: &RecordKey,
        rrset: &RRSet,
    ) -> Result<ApiResponse, ApiError> {
        (**self).update_record(key, rrset).await
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<ApiResponse, ApiError> {
        (**self).delete_record(key).await
    }
}

/// Lifecycle state of a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// No remote record set; the local identifier must be cleared
    Absent,
    /// The remote record set matches local state
    Present,
    /// The remote record set differed and local state was realigned
    Drifted,
}

impl RecordState {
    /// Lowercase label for logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Present => "present",
            Self::Drifted => "drifted",
        }
    }
}

/// Why a read concluded that the record set is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsenceReason {
    /// The identifier could not be decoded; it has no resolvable identity
    MalformedIdentifier(String),
    /// The provider reported the record set as not found
    NotFound,
    /// The provider answered with zero record sets
    EmptyResult,
}

/// Result of a read.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// The record set exists; `record` is local state after applying `changes`
    Present {
        /// Realigned local state
        record: DeclaredRecord,
        /// Fields that drifted (empty when nothing changed)
        changes: RecordChanges,
    },
    /// The record set is gone; local identity must be cleared
    Absent {
        /// Why the record set is considered absent
        reason: AbsenceReason,
    },
}

impl ReadOutcome {
    /// True when the record set still exists at the provider.
    #[must_use]
    pub fn still_exists(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    /// The state this read observed.
    #[must_use]
    pub fn state(&self) -> RecordState {
        match self {
            Self::Present { changes, .. } if changes.is_empty() => RecordState::Present,
            Self::Present { .. } => RecordState::Drifted,
            Self::Absent { .. } => RecordState::Absent,
        }
    }

    /// Realigned local state, when the record set exists.
    #[must_use]
    pub fn record(&self) -> Option<&DeclaredRecord> {
        match self {
            Self::Present { record, .. } => Some(record),
            Self::Absent { .. } => None,
        }
    }

    /// Consume the outcome, returning realigned local state when the record set exists.
    #[must_use]
    pub fn into_record(self) -> Option<DeclaredRecord> {
        match self {
            Self::Present { record, .. } => Some(record),
            Self::Absent { .. } => None,
        }
    }
}

/// What a provider read found for one key.
enum Observation {
    Found(ObservedRecord),
    Missing(AbsenceReason),
}

/// Orchestrates record set lifecycle operations over a [`RecordService`].
#[derive(Debug, Clone)]
pub struct RecordLifecycle<S> {
    service: S,
}

impl<S: RecordService> RecordLifecycle<S> {
    /// Create an orchestrator over a provider collaborator.
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// The provider collaborator.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Create a record set and return its identifier.
    ///
    /// No identifier is produced unless the provider accepted the record set.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidRecord`] if the declaration fails validation,
    /// or [`LifecycleError::RemoteCallFailure`] if the provider call fails.
    pub async fn create(
        &self,
        declared: &DeclaredRecord,
    ) -> Result<RecordIdentifier, LifecycleError> {
        declared.validate()?;
        let key = declared.key();

        info!(
            owner = %key.owner,
            zone = %key.zone,
            record_type = %key.record_type,
            "Creating record set"
        );

        if let Err(e) = self.service.create_record(&key, &declared.to_rrset()).await {
            error!(
                owner = %key.owner,
                zone = %key.zone,
                record_type = %key.record_type,
                reason = e.status_reason(),
                error = %e,
                "Failed to create record set"
            );
            record_lifecycle_operation("create", "error");
            return Err(e.into());
        }

        let identifier = encode(&key);
        info!(identifier = %identifier, "Created record set");
        record_lifecycle_operation("create", "success");
        Ok(identifier)
    }

    /// Read a record set and realign local state with the provider.
    ///
    /// Malformed identifiers, provider not-found errors and empty results all yield
    /// [`ReadOutcome::Absent`]; the caller must clear the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::RemoteCallFailure`] for provider failures other than
    /// not found.
    pub async fn read(
        &self,
        identifier: &RecordIdentifier,
        declared: &DeclaredRecord,
    ) -> Result<ReadOutcome, LifecycleError> {
        let key = match identifier.decode() {
            Ok(key) => key,
            Err(e) => {
                warn!(
                    identifier = %identifier,
                    error = %e,
                    "Record identifier cannot be decoded, treating record set as absent"
                );
                record_lifecycle_operation("read", RecordState::Absent.as_str());
                return Ok(ReadOutcome::Absent {
                    reason: AbsenceReason::MalformedIdentifier(e.reason),
                });
            }
        };

        let observed = match self.observe(&key).await {
            Ok(Observation::Found(observed)) => observed,
            Ok(Observation::Missing(reason)) => {
                info!(
                    identifier = %identifier,
                    reason = ?reason,
                    "Record set no longer exists at provider, clearing identifier"
                );
                record_lifecycle_operation("read", RecordState::Absent.as_str());
                return Ok(ReadOutcome::Absent { reason });
            }
            Err(e) => {
                record_lifecycle_operation("read", "error");
                return Err(e);
            }
        };

        let changes = reconcile(declared, &observed);
        let mut record = declared.clone();

        if changes.is_empty() {
            debug!(identifier = %identifier, "Record set matches local state");
        } else {
            for change in &changes {
                info!(
                    identifier = %identifier,
                    field = %change.field(),
                    change = %change,
                    "Drift detected, realigning local state from provider"
                );
                record_drift(change.field().as_str());
            }
            changes.apply_to(&mut record);
        }

        let outcome = ReadOutcome::Present { record, changes };
        record_lifecycle_operation("read", outcome.state().as_str());
        Ok(outcome)
    }

    /// Replace a record set with the declaration, then re-read it.
    ///
    /// The identifier routes the request. The confirming read goes through
    /// [`RecordLifecycle::read`], so update and read share one reconciliation path.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::MalformedIdentifier`] if the identifier cannot be
    /// routed, [`LifecycleError::InvalidRecord`] if the declaration fails validation,
    /// or [`LifecycleError::RemoteCallFailure`] if the update or the read fails.
    pub async fn update(
        &self,
        identifier: &RecordIdentifier,
        declared: &DeclaredRecord,
    ) -> Result<ReadOutcome, LifecycleError> {
        let key = identifier.decode()?;
        declared.validate()?;

        info!(
            identifier = %identifier,
            ttl = declared.ttl,
            values = declared.record_data.len(),
            "Updating record set"
        );

        if let Err(e) = self.service.update_record(&key, &declared.to_rrset()).await {
            error!(
                identifier = %identifier,
                reason = e.status_reason(),
                error = %e,
                "Failed to update record set"
            );
            record_lifecycle_operation("update", "error");
            return Err(e.into());
        }

        record_lifecycle_operation("update", "success");
        self.read(identifier, declared).await
    }

    /// Delete a record set.
    ///
    /// Deleting a record set that is already gone succeeds, as does deleting under an
    /// identifier that cannot be decoded (there is nothing resolvable to delete).
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::RemoteCallFailure`] for provider failures other than
    /// not found; local state must then be kept so the delete can be retried.
    pub async fn delete(&self, identifier: &RecordIdentifier) -> Result<(), LifecycleError> {
        let key = match identifier.decode() {
            Ok(key) => key,
            Err(e) => {
                warn!(
                    identifier = %identifier,
                    error = %e,
                    "Record identifier cannot be decoded, dropping local state only"
                );
                record_lifecycle_operation("delete", RecordState::Absent.as_str());
                return Ok(());
            }
        };

        info!(identifier = %identifier, "Deleting record set");

        match self.service.delete_record(&key).await {
            Ok(_) => {
                record_lifecycle_operation("delete", "success");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                info!(identifier = %identifier, "Record set already absent at provider");
                record_lifecycle_operation("delete", RecordState::Absent.as_str());
                Ok(())
            }
            Err(e) => {
                error!(
                    identifier = %identifier,
                    reason = e.status_reason(),
                    error = %e,
                    "Failed to delete record set"
                );
                record_lifecycle_operation("delete", "error");
                Err(e.into())
            }
        }
    }

    /// Build local state for an existing record set that has no local state yet.
    ///
    /// The owner name keeps the identifier's spelling when it is equivalent to the
    /// provider's. Returns `None` when the record set does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::MalformedIdentifier`] if the identifier cannot be
    /// decoded, or [`LifecycleError::RemoteCallFailure`] if the read fails.
    pub async fn import(
        &self,
        identifier: &RecordIdentifier,
    ) -> Result<Option<DeclaredRecord>, LifecycleError> {
        let key = identifier.decode()?;

        match self.observe(&key).await {
            Ok(Observation::Found(observed)) => {
                let mut record = observed.to_declared();
                if owner_equivalent(&key.owner, &observed.owner_name, &observed.zone_name) {
                    record.owner_name = key.owner;
                }
                info!(identifier = %identifier, "Imported record set");
                record_lifecycle_operation("import", "success");
                Ok(Some(record))
            }
            Ok(Observation::Missing(reason)) => {
                warn!(
                    identifier = %identifier,
                    reason = ?reason,
                    "Record set to import does not exist"
                );
                record_lifecycle_operation("import", RecordState::Absent.as_str());
                Ok(None)
            }
            Err(e) => {
                record_lifecycle_operation("import", "error");
                Err(e)
            }
        }
    }

    /// Look up a record set without touching local state.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::RemoteCallFailure`] if the read fails for a reason
    /// other than not found.
    pub async fn lookup(&self, key: &RecordKey) -> Result<Option<ObservedRecord>, LifecycleError> {
        Ok(match self.observe(key).await? {
            Observation::Found(observed) => Some(observed),
            Observation::Missing(_) => None,
        })
    }

    async fn observe(&self, key: &RecordKey) -> Result<Observation, LifecycleError> {
        match self.service.read_record(key).await {
            Ok(list) => Ok(match list.first_observed() {
                Some(observed) => Observation::Found(observed),
                None => Observation::Missing(AbsenceReason::EmptyResult),
            }),
            Err(e) if e.is_not_found() => Ok(Observation::Missing(AbsenceReason::NotFound)),
            Err(e) => {
                error!(
                    owner = %key.owner,
                    zone = %key.zone,
                    record_type = %key.record_type,
                    reason = e.status_reason(),
                    error = %e,
                    "Failed to read record set"
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod lifecycle_tests;
