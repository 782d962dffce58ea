// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource record: one logical resource owning one or more remote jobs.

use crate::job::{JobHandle, JobSpec, JobState, RunningJob};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle position of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Nothing submitted yet
    Uncreated,
    /// Jobs submitted, states not yet polled
    Submitted,
    /// States reflect the most recent poll
    Synced,
    /// A delete started but did not confirm every job stopped
    Deleting,
    /// All jobs confirmed stopped; identifier cleared
    Deleted,
}

crate::simple_display! {
    ResourceStatus {
        Uncreated => "uncreated",
        Submitted => "submitted",
        Synced => "synced",
        Deleting => "deleting",
        Deleted => "deleted",
    }
}

/// A states sequence that does not line up with the record's handles.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("{states} job states for {handles} job handles")]
pub struct Misaligned {
    pub handles: usize,
    pub states: usize,
}

/// Persistent record of a resource and the jobs it spawned.
///
/// `handles` and `states` are index-aligned whenever the record has been
/// synced; the only way to replace states is [`ResourceRecord::set_states`],
/// which rejects a sequence of the wrong length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordFields")]
pub struct ResourceRecord {
    id: Option<String>,
    status: ResourceStatus,
    spec: JobSpec,
    handles: Vec<JobHandle>,
    states: Vec<JobState>,
}

#[derive(Deserialize)]
struct RecordFields {
    id: Option<String>,
    status: ResourceStatus,
    spec: JobSpec,
    handles: Vec<JobHandle>,
    #[serde(default)]
    states: Vec<JobState>,
}

impl TryFrom<RecordFields> for ResourceRecord {
    type Error = Misaligned;

    fn try_from(f: RecordFields) -> Result<Self, Self::Error> {
        let unsynced = f.status == ResourceStatus::Submitted && f.states.is_empty();
        if !unsynced && f.handles.len() != f.states.len() {
            return Err(Misaligned { handles: f.handles.len(), states: f.states.len() });
        }
        Ok(Self { id: f.id, status: f.status, spec: f.spec, handles: f.handles, states: f.states })
    }
}

impl ResourceRecord {
    /// Record for freshly submitted jobs. The resource is identified by the
    /// job name.
    pub fn submitted(spec: JobSpec, handles: Vec<JobHandle>) -> Self {
        Self {
            id: Some(spec.name().to_string()),
            status: ResourceStatus::Submitted,
            spec,
            handles,
            states: Vec::new(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    pub fn spec(&self) -> &JobSpec {
        &self.spec
    }

    pub fn handles(&self) -> &[JobHandle] {
        &self.handles
    }

    pub fn states(&self) -> &[JobState] {
        &self.states
    }

    /// The resource still exists remotely (identifier not cleared).
    pub fn is_live(&self) -> bool {
        self.id.is_some()
    }

    /// Replace the polled states. Marks the record synced unless a delete is
    /// in progress.
    pub fn set_states(&mut self, states: Vec<JobState>) -> Result<(), Misaligned> {
        if states.len() != self.handles.len() {
            return Err(Misaligned { handles: self.handles.len(), states: states.len() });
        }
        self.states = states;
        if self.status != ResourceStatus::Deleting {
            self.status = ResourceStatus::Synced;
        }
        Ok(())
    }

    /// Handles paired with their last polled state.
    pub fn jobs(&self) -> impl Iterator<Item = (&JobHandle, JobState)> + '_ {
        self.handles.iter().zip(self.states.iter().copied())
    }

    /// Jobs whose last polled state is `Running`, in handle order.
    pub fn running(&self) -> impl Iterator<Item = RunningJob<'_>> + '_ {
        self.jobs().filter_map(|(handle, state)| RunningJob::new(handle, state))
    }

    pub fn mark_deleting(&mut self) {
        self.status = ResourceStatus::Deleting;
    }

    /// Every job is confirmed stopped: clear the identifier.
    pub fn mark_deleted(&mut self) {
        self.id = None;
        self.status = ResourceStatus::Deleted;
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
