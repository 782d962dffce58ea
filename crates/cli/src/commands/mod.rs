// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod create;
pub mod delete;
pub mod read;
pub mod show;

use anyhow::Result;
use dj_adapters::{JobService, JobServiceError};
use dj_core::{Connection, ResourceRecord};
use dj_engine::{Lifecycle, LifecycleError};

use crate::exit_error::ExitError;
use crate::output::OutputFormat;
use crate::state::StateFile;

/// Everything a command needs, resolved once in `main`.
pub struct Context<S: JobService> {
    pub lifecycle: Lifecycle<S>,
    pub conn: Connection,
    pub state: StateFile,
    pub format: OutputFormat,
}

impl<S: JobService> Context<S> {
    /// Connection for an existing record. Without a configured project the
    /// record's own project is used, so `read`/`delete` work from any
    /// directory holding the state file.
    pub fn conn_for(&self, record: &ResourceRecord) -> Connection {
        if self.conn.project.is_empty() {
            Connection { project: record.spec().project().to_string(), ..self.conn.clone() }
        } else {
            self.conn.clone()
        }
    }

    /// Load the stored record, failing if there is none.
    pub fn require_record(&self) -> Result<ResourceRecord> {
        match self.state.load()? {
            Some(record) => Ok(record),
            None => Err(ExitError::new(
                ExitError::FAILURE,
                format!("no resource state at {}; run `dj create` first", self.state.path().display()),
            )
            .into()),
        }
    }
}

/// Map a lifecycle failure to the error `main` reports.
///
/// Output the tool printed but that no error message includes is appended so
/// a parse failure can be diagnosed without re-running the command.
pub fn lifecycle_error(err: LifecycleError) -> anyhow::Error {
    match err {
        LifecycleError::CancellationIncomplete { .. } => ExitError::new(
            ExitError::INCOMPLETE,
            format!("{err}; run `dj delete` again to retry"),
        )
        .into(),
        LifecycleError::NotCreated => ExitError::new(ExitError::FAILURE, err.to_string()).into(),
        LifecycleError::Service(
            JobServiceError::NoJobIdentifiersFound { ref stdout, .. }
            | JobServiceError::MalformedStatusOutput { ref stdout, .. },
        ) if !stdout.trim().is_empty() => {
            anyhow::anyhow!("{err}\ncaptured stdout:\n{}", stdout.trim())
        }
        other => anyhow::Error::new(other),
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
