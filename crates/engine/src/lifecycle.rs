// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource lifecycle orchestration.
//!
//! ```text
//! create:  verify → submit → poll all                 → Synced
//! read:    verify → poll all                          → Synced
//! delete:  verify → poll all → cancel running → clear → Deleted
//! ```
//!
//! Everything is sequential and in handle order. Polling is fail-fast: one
//! unresolved handle fails the whole operation and leaves the record as it
//! was, so `handles` and `states` never drift apart.

use dj_adapters::{CancelOutcome, JobService, JobServiceError};
use dj_core::{Connection, JobHandle, JobSpec, JobState, Misaligned, ResourceRecord};
use thiserror::Error;
use tracing::Instrument;

/// Errors from a lifecycle operation
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Service(#[from] JobServiceError),

    /// Some running jobs were not cancelled. The resource is kept so a
    /// later delete retries exactly those jobs.
    #[error("cancellation incomplete for job(s): {}", join(job_ids))]
    CancellationIncomplete { job_ids: Vec<JobHandle> },

    #[error("resource has not been created")]
    NotCreated,

    #[error(transparent)]
    Misaligned(#[from] Misaligned),
}

impl LifecycleError {
    /// The underlying service error, if the failure came from a tool call.
    pub fn service_error(&self) -> Option<&JobServiceError> {
        match self {
            LifecycleError::Service(e) => Some(e),
            _ => None,
        }
    }
}

fn join(handles: &[JobHandle]) -> String {
    handles.iter().map(JobHandle::as_str).collect::<Vec<_>>().join(", ")
}

/// Drives a [`JobService`] through the create/read/delete state machine.
#[derive(Clone)]
pub struct Lifecycle<S: JobService> {
    service: S,
}

impl<S: JobService> Lifecycle<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Submit `spec` and return a synced record for the jobs it started.
    ///
    /// Nothing is returned on failure. Jobs submitted before a failed poll
    /// are left running remotely.
    pub async fn create(
        &self,
        conn: &Connection,
        spec: JobSpec,
    ) -> Result<ResourceRecord, LifecycleError> {
        let span = tracing::info_span!("lifecycle.create", resource = spec.name());
        async {
            self.service.verify(conn).await?;
            let handles = self.service.submit(conn, &spec).await?;
            tracing::info!(jobs = %join(&handles), "jobs submitted");

            let mut record = ResourceRecord::submitted(spec, handles);
            let states = self.poll_all(conn, record.handles()).await?;
            record.set_states(states)?;
            log_states(&record);
            Ok(record)
        }
        .instrument(span)
        .await
    }

    /// Refresh the states of every job in `record`.
    pub async fn read(
        &self,
        conn: &Connection,
        record: &mut ResourceRecord,
    ) -> Result<(), LifecycleError> {
        let Some(id) = record.id() else {
            return Err(LifecycleError::NotCreated);
        };
        let span = tracing::info_span!("lifecycle.read", resource = id);
        async {
            self.service.verify(conn).await?;
            self.refresh(conn, record).await
        }
        .instrument(span)
        .await
    }

    /// Cancel every job still running, then clear the resource identifier.
    ///
    /// A soft cancel failure does not stop the remaining cancels; the record
    /// is left `Deleting` with its identifier and fresh states. A hard error
    /// stops immediately.
    pub async fn delete(
        &self,
        conn: &Connection,
        record: &mut ResourceRecord,
    ) -> Result<(), LifecycleError> {
        let Some(id) = record.id().map(str::to_string) else {
            tracing::debug!("resource already deleted");
            return Ok(());
        };
        let span = tracing::info_span!("lifecycle.delete", resource = %id);
        async {
            self.service.verify(conn).await?;
            self.refresh(conn, record).await?;
            record.mark_deleting();

            let mut incomplete = Vec::new();
            for job in record.running() {
                let handle = job.handle().clone();
                match self.service.cancel(conn, job).await? {
                    CancelOutcome::Cancelled => tracing::info!(job_id = %handle, "cancelled"),
                    CancelOutcome::SoftFailed => incomplete.push(handle),
                }
            }

            if !incomplete.is_empty() {
                tracing::warn!(jobs = %join(&incomplete), "cancellation incomplete");
                return Err(LifecycleError::CancellationIncomplete { job_ids: incomplete });
            }
            record.mark_deleted();
            tracing::info!("resource deleted");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Poll every handle in order, stopping at the first failure.
    pub async fn poll_all(
        &self,
        conn: &Connection,
        handles: &[JobHandle],
    ) -> Result<Vec<JobState>, LifecycleError> {
        let mut states = Vec::with_capacity(handles.len());
        for handle in handles {
            states.push(self.service.poll(conn, handle).await?);
        }
        Ok(states)
    }

    async fn refresh(
        &self,
        conn: &Connection,
        record: &mut ResourceRecord,
    ) -> Result<(), LifecycleError> {
        let states = self.poll_all(conn, record.handles()).await?;
        record.set_states(states)?;
        log_states(record);
        Ok(())
    }
}

fn log_states(record: &ResourceRecord) {
    for (handle, state) in record.jobs() {
        tracing::info!(job_id = %handle, %state, "job state");
    }
}

#[cfg(test)]
#[path = "lifecycle_tests/mod.rs"]
mod tests;
