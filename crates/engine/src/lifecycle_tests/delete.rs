// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dj_core::test_support::strategies::arb_job_state;
use proptest::prelude::*;

#[tokio::test]
async fn delete_cancels_running_jobs_and_clears_identifier() {
    let h = setup();
    let mut record = h.created(&["a", "b"]).await;

    h.lifecycle.delete(&h.conn, &mut record).await.unwrap();

    assert_eq!(record.id(), None);
    assert_eq!(record.status(), ResourceStatus::Deleted);
    assert_eq!(h.service.calls(), vec![
        ServiceCall::Verify,
        ServiceCall::Poll("a".into()),
        ServiceCall::Poll("b".into()),
        ServiceCall::Cancel("a".into()),
        ServiceCall::Cancel("b".into()),
    ]);
    assert_eq!(h.service.state("a"), Some(JobState::Cancelled));
}

#[tokio::test]
async fn delete_skips_jobs_that_are_no_longer_running() {
    let h = setup();
    let mut record = h.created(&["done", "running", "failed", "pending"]).await;
    h.service
        .set_state("done", JobState::Done)
        .set_state("failed", JobState::Failed)
        .set_state("pending", JobState::Pending);

    h.lifecycle.delete(&h.conn, &mut record).await.unwrap();
    assert_eq!(h.service.cancelled_ids(), vec!["running"]);
    assert_eq!(record.status(), ResourceStatus::Deleted);
}

#[tokio::test]
async fn delete_uses_refreshed_not_recorded_states() {
    let h = setup();
    let mut record = h.created(&["a"]).await;
    assert_eq!(record.states(), &[JobState::Running]);
    h.service.set_state("a", JobState::Done);

    h.lifecycle.delete(&h.conn, &mut record).await.unwrap();
    assert!(h.service.cancelled_ids().is_empty());
}

#[tokio::test]
async fn delete_of_deleted_resource_is_a_no_op() {
    let h = setup();
    let mut record = h.created(&["a"]).await;
    h.lifecycle.delete(&h.conn, &mut record).await.unwrap();
    h.service.clear_calls();

    h.lifecycle.delete(&h.conn, &mut record).await.unwrap();
    assert!(h.service.calls().is_empty());
    assert_eq!(record.status(), ResourceStatus::Deleted);
}

#[tokio::test]
async fn soft_cancel_failure_reports_incomplete_and_keeps_identifier() {
    let h = setup();
    let mut record = h.created(&["a", "b"]).await;
    h.service.soft_fail_cancel("a");

    let err = h.lifecycle.delete(&h.conn, &mut record).await.unwrap_err();
    match err {
        LifecycleError::CancellationIncomplete { job_ids } => {
            assert_eq!(job_ids, handles(&["a"]));
        }
        other => panic!("unexpected {other:?}"),
    }
    // b is still attempted after a's soft failure
    assert_eq!(h.service.cancelled_ids(), vec!["a", "b"]);
    assert_eq!(record.id(), Some("wordcount"));
    assert_eq!(record.status(), ResourceStatus::Deleting);
    assert_eq!(record.states(), &[JobState::Running, JobState::Running]);
}

#[tokio::test]
async fn retried_delete_only_targets_jobs_still_running() {
    let h = setup();
    let mut record = h.created(&["a", "b", "c"]).await;
    h.service.soft_fail_cancel("b");

    let err = h.lifecycle.delete(&h.conn, &mut record).await.unwrap_err();
    assert!(matches!(err, LifecycleError::CancellationIncomplete { .. }));

    h.service.accept_cancel("b");
    h.service.clear_calls();
    h.lifecycle.delete(&h.conn, &mut record).await.unwrap();

    assert_eq!(h.service.cancelled_ids(), vec!["b"]);
    assert_eq!(record.id(), None);
    assert_eq!(record.states(), &[JobState::Cancelled, JobState::Running, JobState::Cancelled]);
}

#[tokio::test]
async fn hard_cancel_error_aborts_remaining_cancels() {
    let h = setup();
    let mut record = h.created(&["a", "b"]).await;
    h.service.fail_cancel("a", || JobServiceError::CancelFailed {
        job_id: "a".into(),
        stderr: "PERMISSION_DENIED".into(),
    });

    let err = h.lifecycle.delete(&h.conn, &mut record).await.unwrap_err();
    assert!(matches!(err.service_error(), Some(JobServiceError::CancelFailed { .. })));
    assert_eq!(h.service.cancelled_ids(), vec!["a"]);
    assert_eq!(record.id(), Some("wordcount"));
    assert_eq!(record.status(), ResourceStatus::Deleting);
}

#[tokio::test]
async fn delete_poll_failure_cancels_nothing() {
    let h = setup();
    let mut record = h.created(&["a", "b"]).await;
    h.service.fail_poll("b", || JobServiceError::PollFailed {
        job_id: "b".into(),
        stderr: "timeout".into(),
    });

    let err = h.lifecycle.delete(&h.conn, &mut record).await.unwrap_err();
    assert!(matches!(err.service_error(), Some(JobServiceError::PollFailed { .. })));
    assert!(h.service.cancelled_ids().is_empty());
    assert_eq!(record.status(), ResourceStatus::Synced);
    assert!(record.is_live());
}

#[tokio::test]
async fn delete_verification_failure_touches_nothing() {
    let h = setup();
    let mut record = h.created(&["a"]).await;
    h.service.fail_verify(|| JobServiceError::FeatureUnavailable {
        feature: "gcloud alpha dataflow".into(),
        stderr: String::new(),
    });

    assert!(h.lifecycle.delete(&h.conn, &mut record).await.is_err());
    assert_eq!(h.service.calls(), vec![ServiceCall::Verify]);
    assert_eq!(record.status(), ResourceStatus::Synced);
}

fn run<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
}

proptest! {
    #[test]
    fn delete_cancels_exactly_the_running_jobs(states in proptest::collection::vec(arb_job_state(), 1..8)) {
        let ids: Vec<String> = (0..states.len()).map(|i| format!("job-{i}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let expected: Vec<String> = ids
            .iter()
            .zip(&states)
            .filter(|(_, s)| **s == JobState::Running)
            .map(|(id, _)| id.clone())
            .collect();

        let cancelled = run(async {
            let h = setup();
            let mut record = h.created(&id_refs).await;
            for (id, state) in ids.iter().zip(&states) {
                h.service.set_state(id, *state);
            }
            h.lifecycle.delete(&h.conn, &mut record).await.unwrap();
            prop_assert_eq!(record.handles().len(), record.states().len());
            Ok(h.service.cancelled_ids())
        })?;

        prop_assert_eq!(cancelled, expected);
    }
}
