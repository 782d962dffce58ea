// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job status polling through `jobs describe`.

use super::config::ToolConfig;
use super::error::JobServiceError;
use super::parse;
use crate::subprocess::CommandRunner;
use dj_core::{Connection, JobHandle, JobState};

pub(crate) async fn poll<R: CommandRunner>(
    runner: &R,
    tools: &ToolConfig,
    conn: &Connection,
    handle: &JobHandle,
) -> Result<JobState, JobServiceError> {
    let mut invocation = tools
        .feature_invocation("jobs describe", tools.timeouts.poll)
        .args(["jobs", "describe", handle.as_str(), "--format", "json"]);
    if !conn.project.is_empty() {
        invocation = invocation.arg(format!("--project={}", conn.project));
    }

    let output = runner.run(&invocation).await?;
    if !output.success() {
        return Err(JobServiceError::PollFailed {
            job_id: handle.clone(),
            stderr: output.stderr_text(),
        });
    }

    let malformed = |message: String, output: &crate::subprocess::CommandOutput| {
        JobServiceError::MalformedStatusOutput {
            job_id: handle.clone(),
            message,
            stdout: output.stdout.clone(),
            stderr: output.stderr_text(),
        }
    };
    let description =
        parse::parse_job_description(&output.stdout).map_err(|e| malformed(e.to_string(), &output))?;
    if !description.id.is_empty() && description.id != handle.as_str() {
        return Err(malformed(format!("describe returned job {}", description.id), &output));
    }

    let state = description.state();
    if state == JobState::Unknown {
        tracing::warn!(job_id = %handle, current_state = %description.current_state, "unrecognized job state");
    }
    Ok(state)
}
