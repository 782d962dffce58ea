// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job cancellation through `jobs cancel`.

use super::config::ToolConfig;
use super::error::JobServiceError;
use super::{parse, CancelOutcome};
use crate::subprocess::CommandRunner;
use dj_core::{Connection, RunningJob};

/// Request cancellation of a job observed running.
///
/// A nonzero exit is a hard error. A zero exit whose output reports failure
/// is a soft failure: the request was accepted but did not take effect.
pub(crate) async fn cancel<R: CommandRunner>(
    runner: &R,
    tools: &ToolConfig,
    conn: &Connection,
    job: RunningJob<'_>,
) -> Result<CancelOutcome, JobServiceError> {
    let handle = job.handle();
    let mut invocation = tools
        .feature_invocation("jobs cancel", tools.timeouts.cancel)
        .args(["jobs", "cancel", handle.as_str()]);
    if !conn.project.is_empty() {
        invocation = invocation.arg(format!("--project={}", conn.project));
    }

    let output = runner.run(&invocation).await?;
    if !output.success() {
        return Err(JobServiceError::CancelFailed {
            job_id: handle.clone(),
            stderr: output.stderr_text(),
        });
    }

    if parse::cancel_soft_failed(&output.stdout) {
        tracing::warn!(job_id = %handle, stdout = %output.stdout.trim(), "cancel not accepted");
        return Ok(CancelOutcome::SoftFailed);
    }
    Ok(CancelOutcome::Cancelled)
}
