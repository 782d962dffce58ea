// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job service adapter backed by the Dataflow launcher and CLI.

mod cancel;
mod config;
mod error;
pub mod parse;
mod poll;
mod submit;
mod verify;

pub use config::{Timeouts, ToolConfig};
pub use error::JobServiceError;

use crate::subprocess::{CommandRunner, SystemRunner};
use async_trait::async_trait;
use dj_core::{Connection, JobHandle, JobSpec, JobState, RunningJob};
use tracing::Instrument;

/// Result of a cancel request the CLI accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    /// The service reported the job was not cancelled.
    SoftFailed,
}

/// Adapter for the remote job service.
///
/// The lifecycle orchestrator only talks to this trait, so the text-scraping
/// implementation below can be replaced by a native API client.
#[async_trait]
pub trait JobService: Clone + Send + Sync + 'static {
    /// Confirm the tooling is installed, authorized and supports jobs.
    async fn verify(&self, conn: &Connection) -> Result<(), JobServiceError>;

    /// Submit `spec`, returning at least one handle.
    async fn submit(
        &self,
        conn: &Connection,
        spec: &JobSpec,
    ) -> Result<Vec<JobHandle>, JobServiceError>;

    /// Fetch the current state of one job.
    async fn poll(&self, conn: &Connection, handle: &JobHandle)
        -> Result<JobState, JobServiceError>;

    /// Request cancellation of a job observed running.
    async fn cancel(
        &self,
        conn: &Connection,
        job: RunningJob<'_>,
    ) -> Result<CancelOutcome, JobServiceError>;
}

/// [`JobService`] that drives the launcher and the service CLI as subprocesses.
#[derive(Clone)]
pub struct DataflowService<R: CommandRunner = SystemRunner> {
    runner: R,
    tools: ToolConfig,
}

impl<R: CommandRunner> DataflowService<R> {
    pub fn new(runner: R, tools: ToolConfig) -> Self {
        Self { runner, tools }
    }

    pub fn tools(&self) -> &ToolConfig {
        &self.tools
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

#[async_trait]
impl<R: CommandRunner> JobService for DataflowService<R> {
    async fn verify(&self, conn: &Connection) -> Result<(), JobServiceError> {
        let span = tracing::info_span!("job.verify", cli = %self.tools.cli);
        verify::verify(&self.runner, &self.tools, conn).instrument(span).await
    }

    async fn submit(
        &self,
        _conn: &Connection,
        spec: &JobSpec,
    ) -> Result<Vec<JobHandle>, JobServiceError> {
        let span = tracing::info_span!("job.submit", name = spec.name());
        async {
            let start = std::time::Instant::now();
            let result = submit::submit(&self.runner, &self.tools, spec).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(handles) => tracing::info!(jobs = handles.len(), elapsed_ms, "submitted"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "submission failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn poll(
        &self,
        conn: &Connection,
        handle: &JobHandle,
    ) -> Result<JobState, JobServiceError> {
        let span = tracing::info_span!("job.poll", job_id = %handle);
        poll::poll(&self.runner, &self.tools, conn, handle).instrument(span).await
    }

    async fn cancel(
        &self,
        conn: &Connection,
        job: RunningJob<'_>,
    ) -> Result<CancelOutcome, JobServiceError> {
        let span = tracing::info_span!("job.cancel", job_id = %job.handle());
        cancel::cancel(&self.runner, &self.tools, conn, job).instrument(span).await
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeJobService, ServiceCall};

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
