// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job submission through the pipeline launcher.

use super::config::ToolConfig;
use super::error::JobServiceError;
use super::parse;
use crate::subprocess::{CommandRunner, Invocation};
use dj_core::{JobHandle, JobSpec};

/// Launcher argv for `spec`. Values are passed as separate arguments so
/// nothing in the job spec is ever interpreted by a shell.
pub(crate) fn launch_invocation(tools: &ToolConfig, spec: &JobSpec) -> Invocation {
    Invocation::new(&tools.launcher, "launch")
        .args(["-cp", spec.artifact_location(), spec.entry_point()])
        .arg(format!("--project={}", spec.project()))
        .arg(format!("--stagingLocation={}", spec.staging_location()))
        .arg(format!("--jobName={}", spec.name()))
        .arg(format!("--runner={}", tools.runner))
        .timeout(tools.timeouts.submit)
}

/// Run the launcher and collect every job it announced.
///
/// Never returns an empty list: a zero exit without identifiers means the
/// output format is not the one we parse.
pub(crate) async fn submit<R: CommandRunner>(
    runner: &R,
    tools: &ToolConfig,
    spec: &JobSpec,
) -> Result<Vec<JobHandle>, JobServiceError> {
    let output = runner.run(&launch_invocation(tools, spec)).await?;
    if !output.success() {
        return Err(JobServiceError::SubmissionFailed { stderr: output.stderr_text() });
    }

    let handles = parse::extract_job_ids(&output.stdout);
    if handles.is_empty() {
        let stderr = output.stderr_text();
        return Err(JobServiceError::NoJobIdentifiersFound { stdout: output.stdout, stderr });
    }
    Ok(handles)
}
