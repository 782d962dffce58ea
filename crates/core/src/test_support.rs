// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{JobHandle, JobSpec, JobState, ResourceRecord};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core types.
pub mod strategies {
    use crate::JobState;
    use proptest::prelude::*;

    pub fn arb_job_state() -> impl Strategy<Value = JobState> {
        prop_oneof![
            Just(JobState::Pending),
            Just(JobState::Running),
            Just(JobState::Done),
            Just(JobState::Failed),
            Just(JobState::Cancelled),
            Just(JobState::Unknown),
        ]
    }

    /// Identifiers in the shape the launcher prints (`[0-9A-Za-z_-]+`).
    pub fn arb_job_id() -> impl Strategy<Value = String> {
        "[0-9A-Za-z_-]{1,48}"
    }
}

// ── Record factories ────────────────────────────────────────────────────

/// A synced record for the test spec with the given `(job_id, state)` pairs.
pub fn synced_record(jobs: &[(&str, JobState)]) -> ResourceRecord {
    let handles = jobs.iter().map(|(id, _)| JobHandle::new(*id)).collect();
    let mut record = ResourceRecord::submitted(JobSpec::builder().build(), handles);
    // Lengths match by construction.
    let _ = record.set_states(jobs.iter().map(|(_, s)| *s).collect());
    record
}
