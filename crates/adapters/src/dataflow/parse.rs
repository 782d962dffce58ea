// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-output parsers.
//!
//! The job CLI's text output is the only state-transfer protocol. Everything
//! that depends on its exact shape lives here, away from the code that runs
//! the processes.

use dj_core::{JobHandle, JobState};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// Launcher line announcing one submitted job: `Submitted job: <id>`.
#[allow(clippy::expect_used)]
static SUBMITTED_JOB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Submitted job: ([0-9A-Za-z_-]+)").expect("constant regex pattern is valid")
});

/// Marker the cancel command prints when the service refused the request.
pub const CANCEL_FAILURE_MARKER: &str = "Failed";

/// Every job identifier announced in launcher stdout, in order of appearance.
///
/// A pipeline with several stages announces one job per stage.
pub fn extract_job_ids(stdout: &str) -> Vec<JobHandle> {
    SUBMITTED_JOB.captures_iter(stdout).map(|caps| JobHandle::new(&caps[1])).collect()
}

/// The cancel command exited 0 but reports the job was not cancelled.
pub fn cancel_soft_failed(stdout: &str) -> bool {
    stdout.contains(CANCEL_FAILURE_MARKER)
}

/// `jobs describe --format json` record.
///
/// Only `currentState` is required; the other fields are informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    #[serde(default)]
    pub client_request_id: String,
    #[serde(default)]
    pub create_time: String,
    pub current_state: String,
    #[serde(default)]
    pub current_state_time: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default, rename = "type")]
    pub job_type: String,
}

impl JobDescription {
    pub fn state(&self) -> JobState {
        JobState::from_service_name(&self.current_state)
    }
}

pub fn parse_job_description(stdout: &str) -> Result<JobDescription, serde_json::Error> {
    serde_json::from_str(stdout.trim())
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
