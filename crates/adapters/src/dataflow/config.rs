// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool invocation settings.

use crate::subprocess::{Invocation, CANCEL_TIMEOUT, POLL_TIMEOUT, SUBMIT_TIMEOUT, VERIFY_TIMEOUT};
use std::time::Duration;

/// Per-invocation timeouts, one per kind of call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub verify: Duration,
    pub submit: Duration,
    pub poll: Duration,
    pub cancel: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { verify: VERIFY_TIMEOUT, submit: SUBMIT_TIMEOUT, poll: POLL_TIMEOUT, cancel: CANCEL_TIMEOUT }
    }
}

/// Which binaries to run and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Service CLI used for auth, probing, describe and cancel.
    pub cli: String,
    /// Launcher that runs the pipeline's entry point and submits it.
    pub launcher: String,
    /// Subcommand path of the job feature, e.g. `["alpha", "dataflow"]`.
    pub command_group: Vec<String>,
    /// Pipeline runner passed to the launcher.
    pub runner: String,
    pub timeouts: Timeouts,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            cli: "gcloud".to_string(),
            launcher: "java".to_string(),
            command_group: vec!["alpha".to_string(), "dataflow".to_string()],
            runner: "DataflowPipelineRunner".to_string(),
            timeouts: Timeouts::default(),
        }
    }
}

impl ToolConfig {
    dj_core::setters! {
        into {
            cli: String,
            launcher: String,
            runner: String,
        }
        set {
            command_group: Vec<String>,
            timeouts: Timeouts,
        }
    }

    /// Human-readable name of the job feature, e.g. "gcloud alpha dataflow".
    pub fn feature(&self) -> String {
        std::iter::once(self.cli.as_str())
            .chain(self.command_group.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `<cli> <command group…>`, ready for subcommand arguments.
    pub(crate) fn feature_invocation(&self, label: &'static str, timeout: Duration) -> Invocation {
        Invocation::new(&self.cli, label).args(&self.command_group).timeout(timeout)
    }
}
