// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted in-memory job service for orchestrator tests.

use super::{CancelOutcome, JobService, JobServiceError};
use async_trait::async_trait;
use dj_core::{Connection, JobHandle, JobSpec, JobState, RunningJob};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

type ErrorFactory = Arc<dyn Fn() -> JobServiceError + Send + Sync>;

/// Recorded service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Verify,
    Submit(String),
    Poll(String),
    Cancel(String),
}

#[derive(Default)]
struct FakeServiceState {
    submit_ids: Vec<String>,
    submit_error: Option<ErrorFactory>,
    verify_error: Option<ErrorFactory>,
    remote: HashMap<String, JobState>,
    poll_errors: HashMap<String, ErrorFactory>,
    cancel_errors: HashMap<String, ErrorFactory>,
    soft_fail_cancel: HashSet<String>,
    calls: Vec<ServiceCall>,
}

/// Fake job service holding remote job states in memory.
///
/// Submitted jobs start `Running`. A successful cancel moves a job to
/// `Cancelled`; a soft-failed one leaves it as it was.
#[derive(Clone, Default)]
pub struct FakeJobService {
    inner: Arc<Mutex<FakeServiceState>>,
}

impl FakeJobService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Job identifiers the next submission announces.
    pub fn submit_returns(&self, ids: &[&str]) -> &Self {
        self.inner.lock().submit_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn fail_submit(
        &self,
        err: impl Fn() -> JobServiceError + Send + Sync + 'static,
    ) -> &Self {
        self.inner.lock().submit_error = Some(Arc::new(err));
        self
    }

    pub fn fail_verify(
        &self,
        err: impl Fn() -> JobServiceError + Send + Sync + 'static,
    ) -> &Self {
        self.inner.lock().verify_error = Some(Arc::new(err));
        self
    }

    pub fn clear_verify_failure(&self) -> &Self {
        self.inner.lock().verify_error = None;
        self
    }

    /// Change a job's remote state, as if it moved on outside our control.
    pub fn set_state(&self, id: &str, state: JobState) -> &Self {
        self.inner.lock().remote.insert(id.to_string(), state);
        self
    }

    pub fn state(&self, id: &str) -> Option<JobState> {
        self.inner.lock().remote.get(id).copied()
    }

    pub fn fail_poll(
        &self,
        id: &str,
        err: impl Fn() -> JobServiceError + Send + Sync + 'static,
    ) -> &Self {
        self.inner.lock().poll_errors.insert(id.to_string(), Arc::new(err));
        self
    }

    pub fn fail_cancel(
        &self,
        id: &str,
        err: impl Fn() -> JobServiceError + Send + Sync + 'static,
    ) -> &Self {
        self.inner.lock().cancel_errors.insert(id.to_string(), Arc::new(err));
        self
    }

    /// Cancels of `id` report a soft failure until [`Self::accept_cancel`].
    pub fn soft_fail_cancel(&self, id: &str) -> &Self {
        self.inner.lock().soft_fail_cancel.insert(id.to_string());
        self
    }

    pub fn accept_cancel(&self, id: &str) -> &Self {
        self.inner.lock().soft_fail_cancel.remove(id);
        self
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.inner.lock().calls.clone()
    }

    /// Job ids cancel was requested for, in order.
    pub fn cancelled_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ServiceCall::Cancel(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }
}

#[async_trait]
impl JobService for FakeJobService {
    async fn verify(&self, _conn: &Connection) -> Result<(), JobServiceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ServiceCall::Verify);
        match &inner.verify_error {
            Some(err) => Err(err()),
            None => Ok(()),
        }
    }

    async fn submit(
        &self,
        _conn: &Connection,
        spec: &JobSpec,
    ) -> Result<Vec<JobHandle>, JobServiceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ServiceCall::Submit(spec.name().to_string()));
        if let Some(err) = &inner.submit_error {
            return Err(err());
        }
        if inner.submit_ids.is_empty() {
            return Err(JobServiceError::NoJobIdentifiersFound {
                stdout: String::new(),
                stderr: String::new(),
            });
        }
        let ids = inner.submit_ids.clone();
        for id in &ids {
            inner.remote.insert(id.clone(), JobState::Running);
        }
        Ok(ids.into_iter().map(JobHandle::from).collect())
    }

    async fn poll(
        &self,
        _conn: &Connection,
        handle: &JobHandle,
    ) -> Result<JobState, JobServiceError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ServiceCall::Poll(handle.to_string()));
        if let Some(err) = inner.poll_errors.get(handle.as_str()) {
            return Err(err());
        }
        inner.remote.get(handle.as_str()).copied().ok_or_else(|| JobServiceError::PollFailed {
            job_id: handle.clone(),
            stderr: format!("NOT_FOUND: job {handle} does not exist"),
        })
    }

    async fn cancel(
        &self,
        _conn: &Connection,
        job: RunningJob<'_>,
    ) -> Result<CancelOutcome, JobServiceError> {
        let id = job.handle().to_string();
        let mut inner = self.inner.lock();
        inner.calls.push(ServiceCall::Cancel(id.clone()));
        if let Some(err) = inner.cancel_errors.get(&id) {
            return Err(err());
        }
        if inner.soft_fail_cancel.contains(&id) {
            return Ok(CancelOutcome::SoftFailed);
        }
        inner.remote.insert(id, JobState::Cancelled);
        Ok(CancelOutcome::Cancelled)
    }
}
