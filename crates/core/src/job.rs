// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job specification, service-assigned handles and normalized job state.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// Errors from validating a [`JobSpec`] at the boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobSpecError {
    #[error("job spec field `{field}` must not be empty")]
    Empty { field: &'static str },

    #[error("invalid job name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },
}

/// What to launch: one submission of a pipeline artifact.
///
/// Constructed only through [`JobSpec::new`] (or deserialization, which runs
/// the same checks) and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JobSpecFields")]
pub struct JobSpec {
    name: String,
    artifact_location: String,
    entry_point: String,
    project: String,
    staging_location: String,
}

#[derive(Deserialize)]
struct JobSpecFields {
    name: String,
    artifact_location: String,
    entry_point: String,
    project: String,
    staging_location: String,
}

impl TryFrom<JobSpecFields> for JobSpec {
    type Error = JobSpecError;

    fn try_from(f: JobSpecFields) -> Result<Self, Self::Error> {
        JobSpec::new(f.name, f.artifact_location, f.entry_point, f.project, f.staging_location)
    }
}

impl JobSpec {
    pub fn new(
        name: impl Into<String>,
        artifact_location: impl Into<String>,
        entry_point: impl Into<String>,
        project: impl Into<String>,
        staging_location: impl Into<String>,
    ) -> Result<Self, JobSpecError> {
        let spec = Self {
            name: name.into().trim().to_string(),
            artifact_location: artifact_location.into().trim().to_string(),
            entry_point: entry_point.into().trim().to_string(),
            project: project.into().trim().to_string(),
            staging_location: staging_location.into().trim().to_string(),
        };
        for (field, value) in [
            ("name", &spec.name),
            ("artifact_location", &spec.artifact_location),
            ("entry_point", &spec.entry_point),
            ("project", &spec.project),
            ("staging_location", &spec.staging_location),
        ] {
            if value.is_empty() {
                return Err(JobSpecError::Empty { field });
            }
        }
        validate_job_name(&spec.name)?;
        Ok(spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artifact_location(&self) -> &str {
        &self.artifact_location
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn staging_location(&self) -> &str {
        &self.staging_location
    }
}

crate::builder! {
    pub struct JobSpecBuilder => JobSpec {
        into {
            name: String = "wordcount",
            artifact_location: String = "/opt/pipelines/wordcount-bundled.jar",
            entry_point: String = "com.example.WordCount",
            project: String = "test-project",
            staging_location: String = "gs://test-bucket/staging",
        }
    }
}

/// Service job names: a lowercase letter, then lowercase letters, digits or
/// `-`, not ending in `-`.
fn validate_job_name(name: &str) -> Result<(), JobSpecError> {
    let invalid = |reason| Err(JobSpecError::InvalidName { name: name.to_string(), reason });

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return invalid("must start with a lowercase letter"),
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return invalid("only lowercase letters, digits and '-' are allowed");
    }
    if name.ends_with('-') {
        return invalid("must not end with '-'");
    }
    Ok(())
}

/// Identifier the remote service assigned to one submitted job.
///
/// Opaque to everything except the process-output parsers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(SmolStr);

impl JobHandle {
    pub fn new(job_id: impl Into<SmolStr>) -> Self {
        Self(job_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobHandle {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for JobHandle {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for JobHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for JobHandle {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Normalized state of a remote job.
///
/// Only ever refreshed by polling the service. Persisted using the service's
/// own state names so stored records stay readable next to `describe` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    Pending,
    Running,
    Done,
    Failed,
    Cancelled,
    Unknown,
}

impl JobState {
    /// Map a service state name by exact match.
    ///
    /// Names the service may add later map to `Unknown` instead of failing.
    pub fn from_service_name(name: &str) -> Self {
        match name {
            "JOB_STATE_PENDING" | "JOB_STATE_QUEUED" | "JOB_STATE_STOPPED" => JobState::Pending,
            "JOB_STATE_RUNNING" => JobState::Running,
            "JOB_STATE_DONE" => JobState::Done,
            "JOB_STATE_FAILED" => JobState::Failed,
            "JOB_STATE_CANCELLED" => JobState::Cancelled,
            _ => JobState::Unknown,
        }
    }

    pub fn service_name(self) -> &'static str {
        match self {
            JobState::Pending => "JOB_STATE_PENDING",
            JobState::Running => "JOB_STATE_RUNNING",
            JobState::Done => "JOB_STATE_DONE",
            JobState::Failed => "JOB_STATE_FAILED",
            JobState::Cancelled => "JOB_STATE_CANCELLED",
            JobState::Unknown => "JOB_STATE_UNKNOWN",
        }
    }

    /// The job will not change state again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Failed | JobState::Cancelled)
    }
}

crate::simple_display! {
    JobState {
        Pending => "pending",
        Running => "running",
        Done => "done",
        Failed => "failed",
        Cancelled => "cancelled",
        Unknown => "unknown",
    }
}

impl From<String> for JobState {
    fn from(name: String) -> Self {
        JobState::from_service_name(&name)
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        state.service_name().to_string()
    }
}

/// A handle whose last polled state was `Running`.
///
/// The canceller only accepts this type, so a cancel can never be issued for a
/// job that was not observed running.
#[derive(Debug, Clone, Copy)]
pub struct RunningJob<'a> {
    handle: &'a JobHandle,
}

impl<'a> RunningJob<'a> {
    pub fn new(handle: &'a JobHandle, state: JobState) -> Option<Self> {
        (state == JobState::Running).then_some(Self { handle })
    }

    pub fn handle(&self) -> &'a JobHandle {
        self.handle
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
