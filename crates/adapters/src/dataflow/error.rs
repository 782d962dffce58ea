// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job service error taxonomy.

use crate::credential::CredentialError;
use crate::subprocess::SubprocessError;
use dj_core::JobHandle;
use thiserror::Error;

/// Errors from talking to the job service through its CLI.
///
/// Variants produced from a finished process carry the captured stderr so
/// operators can diagnose tool failures without re-running commands.
#[derive(Debug, Error)]
pub enum JobServiceError {
    #[error("`{tool}` is not installed or not on PATH")]
    ToolNotInstalled { tool: String },

    #[error("credential activation failed: {stderr}")]
    AuthenticationFailed { stderr: String },

    #[error("`{feature}` is not available in the installed CLI: {stderr}")]
    FeatureUnavailable { feature: String, stderr: String },

    #[error("job submission failed: {stderr}")]
    SubmissionFailed { stderr: String },

    #[error("launcher exited successfully but printed no job identifiers")]
    NoJobIdentifiersFound { stdout: String, stderr: String },

    #[error("failed to poll job {job_id}: {stderr}")]
    PollFailed { job_id: JobHandle, stderr: String },

    #[error("malformed status output for job {job_id}: {message}")]
    MalformedStatusOutput { job_id: JobHandle, message: String, stdout: String, stderr: String },

    #[error("failed to cancel job {job_id}: {stderr}")]
    CancelFailed { job_id: JobHandle, stderr: String },

    #[error(transparent)]
    Subprocess(#[from] SubprocessError),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl JobServiceError {
    /// Captured stderr of the failing process, if the error came from one.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            JobServiceError::AuthenticationFailed { stderr }
            | JobServiceError::FeatureUnavailable { stderr, .. }
            | JobServiceError::SubmissionFailed { stderr }
            | JobServiceError::NoJobIdentifiersFound { stderr, .. }
            | JobServiceError::PollFailed { stderr, .. }
            | JobServiceError::MalformedStatusOutput { stderr, .. }
            | JobServiceError::CancelFailed { stderr, .. } => Some(stderr),
            JobServiceError::Subprocess(e) => e.stderr(),
            JobServiceError::ToolNotInstalled { .. } | JobServiceError::Credential(_) => None,
        }
    }
}
