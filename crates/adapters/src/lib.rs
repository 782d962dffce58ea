// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dj-adapters: subprocess, credential and job service adapters

pub mod credential;
pub mod dataflow;
pub mod subprocess;

pub use credential::{materialize, CredentialError, MaterializedCredential};
pub use dataflow::{
    CancelOutcome, DataflowService, JobService, JobServiceError, Timeouts, ToolConfig,
};
pub use subprocess::{CommandOutput, CommandRunner, Invocation, SubprocessError, SystemRunner};

#[cfg(any(test, feature = "test-support"))]
pub use dataflow::{FakeJobService, ServiceCall};
#[cfg(any(test, feature = "test-support"))]
pub use subprocess::{FakeReply, FakeRunner};
