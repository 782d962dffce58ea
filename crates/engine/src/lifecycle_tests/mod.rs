// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dj_adapters::{FakeJobService, ServiceCall};
use dj_core::ResourceStatus;

mod create;
mod dataflow;
mod delete;
mod read;

struct TestHarness {
    lifecycle: Lifecycle<FakeJobService>,
    service: FakeJobService,
    conn: Connection,
}

fn setup() -> TestHarness {
    let service = FakeJobService::new();
    TestHarness {
        lifecycle: Lifecycle::new(service.clone()),
        service,
        conn: Connection::new("test-project"),
    }
}

impl TestHarness {
    /// Create a resource whose jobs are `ids`, all running, and forget the
    /// calls that took.
    async fn created(&self, ids: &[&str]) -> ResourceRecord {
        self.service.submit_returns(ids);
        let record = self.lifecycle.create(&self.conn, JobSpec::builder().build()).await.unwrap();
        self.service.clear_calls();
        record
    }
}

fn handles(ids: &[&str]) -> Vec<JobHandle> {
    ids.iter().map(|id| JobHandle::new(*id)).collect()
}

#[tokio::test]
async fn poll_all_preserves_handle_order() {
    let h = setup();
    h.service
        .set_state("c", JobState::Done)
        .set_state("a", JobState::Running)
        .set_state("b", JobState::Failed);

    let states = h.lifecycle.poll_all(&h.conn, &handles(&["a", "b", "c"])).await.unwrap();
    assert_eq!(states, vec![JobState::Running, JobState::Failed, JobState::Done]);
}

#[tokio::test]
async fn poll_all_stops_at_first_failure() {
    let h = setup();
    h.service.set_state("a", JobState::Running).set_state("c", JobState::Running);

    let err = h.lifecycle.poll_all(&h.conn, &handles(&["a", "b", "c"])).await.unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Service(JobServiceError::PollFailed { ref job_id, .. }) if *job_id == "b"
    ));
    assert_eq!(h.service.calls(), vec![
        ServiceCall::Poll("a".into()),
        ServiceCall::Poll("b".into()),
    ]);
}

#[tokio::test]
async fn poll_all_of_nothing_is_empty() {
    let h = setup();
    assert!(h.lifecycle.poll_all(&h.conn, &[]).await.unwrap().is_empty());
    assert!(h.service.calls().is_empty());
}

#[test]
fn cancellation_incomplete_lists_job_ids() {
    let err = LifecycleError::CancellationIncomplete { job_ids: handles(&["a", "b"]) };
    assert_eq!(err.to_string(), "cancellation incomplete for job(s): a, b");
    assert!(err.service_error().is_none());
}
