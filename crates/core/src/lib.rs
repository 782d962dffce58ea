// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dj-core: data model for the dj batch-job lifecycle manager

pub mod macros;

pub mod connection;
pub mod job;
pub mod resource;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use connection::Connection;
#[cfg(any(test, feature = "test-support"))]
pub use job::JobSpecBuilder;
pub use job::{JobHandle, JobSpec, JobSpecError, JobState, RunningJob};
pub use resource::{Misaligned, ResourceRecord, ResourceStatus};
