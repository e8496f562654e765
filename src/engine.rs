// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Plan and apply declared record sets against the provider.
//!
//! The engine drives [`RecordLifecycle`] the way a declarative tool does:
//!
//! 1. **Refresh** - read every record set in state, realign drifted fields and drop
//!    record sets that no longer exist.
//! 2. **Plan** - compare declarations with state and decide one action per resource.
//! 3. **Apply** - execute the actions: deletes, then replaces, creates and updates.
//!
//! State is saved after every successful mutation, so a failure part way through
//! never leaves a remote record set without a state entry.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{error, info, warn};

use crate::errors::LifecycleError;
use crate::lifecycle::{ReadOutcome, RecordLifecycle, RecordService};
use crate::normalize::{owner_equivalent, types_equal};
use crate::record::DeclaredRecord;
use crate::record_key::RecordIdentifier;
use crate::state::StateFile;

/// What apply will do for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    /// Declared but not in state
    Create {
        /// Resource name
        name: String,
        /// Desired record set
        record: DeclaredRecord,
    },
    /// Owner, zone or type changed; the record set must be deleted and recreated
    Replace {
        /// Resource name
        name: String,
        /// Identifier of the record set to delete
        id: RecordIdentifier,
        /// Desired record set
        record: DeclaredRecord,
    },
    /// TTL or data changed
    Update {
        /// Resource name
        name: String,
        /// Identifier of the record set to update
        id: RecordIdentifier,
        /// Desired record set
        record: DeclaredRecord,
    },
    /// In state but no longer declared
    Delete {
        /// Resource name
        name: String,
        /// Identifier of the record set to delete
        id: RecordIdentifier,
    },
    /// Declaration and state agree
    NoOp {
        /// Resource name
        name: String,
    },
}

impl PlannedAction {
    /// Resource name the action applies to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Create { name, .. }
            | Self::Replace { name, .. }
            | Self::Update { name, .. }
            | Self::Delete { name, .. }
            | Self::NoOp { name } => name,
        }
    }

    /// Lowercase action label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Replace { .. } => "replace",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::NoOp { .. } => "no-op",
        }
    }

    fn order(&self) -> u8 {
        match self {
            Self::Delete { .. } => 0,
            Self::Replace { .. } => 1,
            Self::Create { .. } => 2,
            Self::Update { .. } => 3,
            Self::NoOp { .. } => 4,
        }
    }
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { name, record }
            | Self::Replace { name, record, .. }
            | Self::Update { name, record, .. } => write!(
                f,
                "{:<8} {name} ({} {} {} ttl={})",
                self.kind(),
                record.owner_name,
                record.zone_name,
                record.record_type,
                record.ttl
            ),
            Self::Delete { name, id } => write!(f, "{:<8} {name} ({id})", self.kind()),
            Self::NoOp { name } => write!(f, "{:<8} {name}", self.kind()),
        }
    }
}

/// Ordered list of actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    actions: Vec<PlannedAction>,
}

impl Plan {
    /// Actions in execution order.
    pub fn actions(&self) -> &[PlannedAction] {
        &self.actions
    }

    /// True when at least one action mutates the provider.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.actions
            .iter()
            .any(|a| !matches!(a, PlannedAction::NoOp { .. }))
    }

    /// Number of actions of one kind.
    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.actions.iter().filter(|a| a.kind() == kind).count()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in self.actions.iter().filter(|a| a.kind() != "no-op") {
            writeln!(f, "{action}")?;
        }
        write!(
            f,
            "Plan: {} to create, {} to replace, {} to update, {} to delete, {} unchanged",
            self.count("create"),
            self.count("replace"),
            self.count("update"),
            self.count("delete"),
            self.count("no-op")
        )
    }
}

/// True when two declarations address the same remote record set.
fn same_identity(a: &DeclaredRecord, b: &DeclaredRecord) -> bool {
    a.zone_name == b.zone_name
        && types_equal(&a.record_type, &b.record_type)
        && (owner_equivalent(&a.owner_name, &b.owner_name, &a.zone_name)
            || owner_equivalent(&b.owner_name, &a.owner_name, &a.zone_name))
}

/// Compare declarations with state.
#[must_use]
pub fn plan(records: &BTreeMap<String, DeclaredRecord>, state: &StateFile) -> Plan {
    let mut actions = Vec::with_capacity(records.len() + state.resources.len());

    for (name, record) in records {
        let action = match state.get(name) {
            None => PlannedAction::Create {
                name: name.clone(),
                record: record.clone(),
            },
            Some(entry) if !same_identity(record, &entry.record) => PlannedAction::Replace {
                name: name.clone(),
                id: entry.id.clone(),
                record: record.clone(),
            },
            Some(entry)
                if entry.record.ttl != record.ttl
                    || entry.record.record_data != record.record_data =>
            {
                PlannedAction::Update {
                    name: name.clone(),
                    id: entry.id.clone(),
                    record: record.clone(),
                }
            }
            Some(_) => PlannedAction::NoOp { name: name.clone() },
        };
        actions.push(action);
    }

    for (name, entry) in &state.resources {
        if !records.contains_key(name) {
            actions.push(PlannedAction::Delete {
                name: name.clone(),
                id: entry.id.clone(),
            });
        }
    }

    // Stable: names stay sorted within each kind
    actions.sort_by_key(PlannedAction::order);
    Plan { actions }
}

/// Outcome of a refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Record sets read
    pub checked: usize,
    /// Record sets whose state was realigned
    pub drifted: usize,
    /// Record sets dropped from state because they no longer exist
    pub removed: usize,
}

/// Outcome of an apply or destroy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Record sets created
    pub created: usize,
    /// Record sets deleted and recreated
    pub replaced: usize,
    /// Record sets updated in place
    pub updated: usize,
    /// Record sets deleted
    pub deleted: usize,
    /// Resources left alone
    pub unchanged: usize,
}

impl fmt::Display for ApplySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} replaced, {} updated, {} deleted, {} unchanged",
            self.created, self.replaced, self.updated, self.deleted, self.unchanged
        )
    }
}

/// Drives lifecycle operations and keeps the state file in step.
pub struct Engine<S> {
    lifecycle: RecordLifecycle<S>,
    state_path: PathBuf,
}

impl<S: RecordService> Engine<S> {
    /// Create an engine that persists state at `state_path`.
    pub fn new(lifecycle: RecordLifecycle<S>, state_path: impl Into<PathBuf>) -> Self {
        Self {
            lifecycle,
            state_path: state_path.into(),
        }
    }

    /// The lifecycle orchestrator.
    pub fn lifecycle(&self) -> &RecordLifecycle<S> {
        &self.lifecycle
    }

    /// Path of the state file.
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Load state from the configured path.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file exists but cannot be read.
    pub fn load_state(&self) -> Result<StateFile> {
        StateFile::load(&self.state_path)
            .with_context(|| format!("Failed to load state from {}", self.state_path.display()))
    }

    fn save(&self, state: &mut StateFile) -> Result<()> {
        state
            .save(&self.state_path)
            .with_context(|| format!("Failed to save state to {}", self.state_path.display()))
    }

    /// Read every record set in state and realign it with the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails for a reason other than absence, or if state
    /// cannot be saved.
    pub async fn refresh(&self, state: &mut StateFile) -> Result<RefreshSummary> {
        let summary = self.realign(state).await?;
        if summary.drifted > 0 || summary.removed > 0 {
            self.save(state)?;
        }
        Ok(summary)
    }

    /// Refresh a copy of state and plan against it. Nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails for a reason other than absence.
    pub async fn preview(
        &self,
        records: &BTreeMap<String, DeclaredRecord>,
        state: &StateFile,
    ) -> Result<Plan> {
        let mut refreshed = state.clone();
        self.realign(&mut refreshed).await?;
        Ok(plan(records, &refreshed))
    }

    async fn realign(&self, state: &mut StateFile) -> Result<RefreshSummary> {
        let mut summary = RefreshSummary::default();
        let entries: Vec<_> = state
            .resources
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect();

        for (name, entry) in entries {
            summary.checked += 1;
            let outcome = self
                .lifecycle
                .read(&entry.id, &entry.record)
                .await
                .inspect_err(|e| log_failure(&name, "read", e))
                .with_context(|| format!("Failed to refresh {name}"))?;

            match outcome {
                ReadOutcome::Present { record, changes } => {
                    if !changes.is_empty() {
                        info!(resource = %name, changes = changes.len(), "Realigned drifted state");
                        summary.drifted += 1;
                        state.insert(name, entry.id, record);
                    }
                }
                ReadOutcome::Absent { reason } => {
                    warn!(
                        resource = %name,
                        reason = ?reason,
                        "Record set is gone, removing from state"
                    );
                    summary.removed += 1;
                    state.remove(&name);
                }
            }
        }

        Ok(summary)
    }

    /// Refresh, plan and execute.
    ///
    /// # Errors
    ///
    /// Stops at the first failed action and returns its error. Actions completed
    /// before the failure are already saved.
    pub async fn apply(
        &self,
        records: &BTreeMap<String, DeclaredRecord>,
        state: &mut StateFile,
    ) -> Result<ApplySummary> {
        self.refresh(state).await?;
        let plan = plan(records, state);
        let mut summary = ApplySummary::default();

        for action in plan.actions() {
            match action {
                PlannedAction::Delete { name, id } => {
                    self.delete_resource(name, id, state).await?;
                    summary.deleted += 1;
                }
                PlannedAction::Replace { name, id, record } => {
                    info!(resource = %name, "Replacing record set");
                    self.delete_resource(name, id, state).await?;
                    self.create_resource(name, record, state).await?;
                    summary.replaced += 1;
                }
                PlannedAction::Create { name, record } => {
                    self.create_resource(name, record, state).await?;
                    summary.created += 1;
                }
                PlannedAction::Update { name, id, record } => {
                    let outcome = self
                        .lifecycle
                        .update(id, record)
                        .await
                        .inspect_err(|e| log_failure(name, "update", e))
                        .with_context(|| format!("Failed to update {name}"))?;
                    self.store_outcome(name, id, outcome, state)?;
                    summary.updated += 1;
                }
                PlannedAction::NoOp { .. } => summary.unchanged += 1,
            }
        }

        info!(%summary, "Apply complete");
        Ok(summary)
    }

    /// Delete every record set in state.
    ///
    /// # Errors
    ///
    /// Stops at the first failed delete; earlier deletes are already saved.
    pub async fn destroy(&self, state: &mut StateFile) -> Result<ApplySummary> {
        let mut summary = ApplySummary::default();
        let entries: Vec<_> = state
            .resources
            .iter()
            .map(|(name, entry)| (name.clone(), entry.id.clone()))
            .collect();

        for (name, id) in entries {
            self.delete_resource(&name, &id, state).await?;
            summary.deleted += 1;
        }

        info!(%summary, "Destroy complete");
        Ok(summary)
    }

    /// Bring an existing record set under management.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already managed, the identifier is malformed,
    /// the record set does not exist, or the read fails.
    pub async fn import(
        &self,
        name: &str,
        id: &RecordIdentifier,
        state: &mut StateFile,
    ) -> Result<DeclaredRecord> {
        if let Some(existing) = state.get(name) {
            bail!("Resource {name} is already managed as {}", existing.id);
        }

        let Some(record) = self
            .lifecycle
            .import(id)
            .await
            .inspect_err(|e| log_failure(name, "import", e))
            .with_context(|| format!("Failed to import {name}"))?
        else {
            bail!("Record set {id} does not exist at the provider");
        };

        state.insert(name, id.clone(), record.clone());
        self.save(state)?;
        info!(resource = %name, identifier = %id, "Imported record set");
        Ok(record)
    }

    async fn delete_resource(
        &self,
        name: &str,
        id: &RecordIdentifier,
        state: &mut StateFile,
    ) -> Result<()> {
        self.lifecycle
            .delete(id)
            .await
            .inspect_err(|e| log_failure(name, "delete", e))
            .with_context(|| format!("Failed to delete {name}"))?;
        state.remove(name);
        self.save(state)
    }

    async fn create_resource(
        &self,
        name: &str,
        record: &DeclaredRecord,
        state: &mut StateFile,
    ) -> Result<()> {
        let id = self
            .lifecycle
            .create(record)
            .await
            .inspect_err(|e| log_failure(name, "create", e))
            .with_context(|| format!("Failed to create {name}"))?;
        state.insert(name, id.clone(), record.clone());
        self.save(state)?;

        let outcome = self
            .lifecycle
            .read(&id, record)
            .await
            .inspect_err(|e| log_failure(name, "read", e))
            .with_context(|| format!("Failed to read {name} after create"))?;
        self.store_outcome(name, &id, outcome, state)
    }

    fn store_outcome(
        &self,
        name: &str,
        id: &RecordIdentifier,
        outcome: ReadOutcome,
        state: &mut StateFile,
    ) -> Result<()> {
        match outcome.into_record() {
            Some(record) => state.insert(name, id.clone(), record),
            None => {
                warn!(resource = %name, identifier = %id, "Record set vanished right after write");
                state.remove(name);
            }
        }
        self.save(state)
    }
}

fn log_failure(resource: &str, action: &'static str, e: &LifecycleError) {
    error!(
        resource = %resource,
        action,
        reason = e.status_reason(),
        error = %e,
        "Record set action failed"
    );
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
