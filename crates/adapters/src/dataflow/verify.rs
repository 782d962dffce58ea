// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool availability verification.
//!
//! Runs at the start of every operation, never cached: the installed CLI and
//! its active account can change between calls.

use super::config::ToolConfig;
use super::error::JobServiceError;
use crate::credential;
use crate::subprocess::{CommandRunner, Invocation};
use dj_core::Connection;

/// Check the CLI is installed, activate credentials, and probe the job
/// feature, in that order.
pub(crate) async fn verify<R: CommandRunner>(
    runner: &R,
    tools: &ToolConfig,
    conn: &Connection,
) -> Result<(), JobServiceError> {
    let Some(cli_path) = runner.resolve(&tools.cli) else {
        return Err(JobServiceError::ToolNotInstalled { tool: tools.cli.clone() });
    };
    tracing::debug!(cli = %cli_path.display(), "resolved job CLI");

    if let Some(raw) = conn.credentials.as_deref() {
        activate(runner, tools, raw).await?;
    }

    let probe = tools.feature_invocation("feature probe", tools.timeouts.verify).arg("--help");
    let output = runner.run(&probe).await?;
    if !output.success() {
        return Err(JobServiceError::FeatureUnavailable {
            feature: tools.feature(),
            stderr: output.stderr_text(),
        });
    }
    Ok(())
}

/// Activate the service account. The materialized key file is released
/// before returning, whatever the outcome.
async fn activate<R: CommandRunner>(
    runner: &R,
    tools: &ToolConfig,
    raw: &str,
) -> Result<(), JobServiceError> {
    let key_file = credential::materialize(raw)?;
    let invocation = Invocation::new(&tools.cli, "auth activate")
        .args(["auth", "activate-service-account", "--key-file"])
        .arg(key_file.path().to_string_lossy())
        .timeout(tools.timeouts.verify);
    let result = runner.run(&invocation).await;
    let released = key_file.release();

    match result {
        Ok(output) if output.success() => {}
        failed => {
            if let Err(e) = released {
                tracing::warn!(error = %e, "failed to release credential file");
            }
            return Err(match failed {
                Ok(output) => JobServiceError::AuthenticationFailed { stderr: output.stderr_text() },
                Err(e) => e.into(),
            });
        }
    }
    released?;
    tracing::debug!("credentials activated");
    Ok(())
}
