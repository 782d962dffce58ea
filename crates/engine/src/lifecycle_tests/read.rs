// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn read_refreshes_states_from_the_service() {
    let h = setup();
    let mut record = h.created(&["fast", "slow"]).await;
    h.service.set_state("fast", JobState::Done);

    h.lifecycle.read(&h.conn, &mut record).await.unwrap();
    assert_eq!(record.states(), &[JobState::Done, JobState::Running]);
    assert_eq!(record.status(), ResourceStatus::Synced);
    assert_eq!(h.service.calls(), vec![
        ServiceCall::Verify,
        ServiceCall::Poll("fast".into()),
        ServiceCall::Poll("slow".into()),
    ]);
}

#[tokio::test]
async fn repeated_reads_are_stable() {
    let h = setup();
    let mut record = h.created(&["a", "b"]).await;
    h.service.set_state("b", JobState::Failed);

    h.lifecycle.read(&h.conn, &mut record).await.unwrap();
    let first = record.clone();
    h.lifecycle.read(&h.conn, &mut record).await.unwrap();
    assert_eq!(record, first);
}

#[tokio::test]
async fn read_keeps_previous_states_when_a_poll_fails() {
    let h = setup();
    let mut record = h.created(&["a", "b"]).await;
    let before = record.clone();
    h.service.set_state("a", JobState::Done).fail_poll("b", || JobServiceError::MalformedStatusOutput {
        job_id: "b".into(),
        message: "expected value at line 1 column 1".into(),
        stdout: "garbage".into(),
        stderr: String::new(),
    });

    let err = h.lifecycle.read(&h.conn, &mut record).await.unwrap_err();
    assert!(matches!(err.service_error(), Some(JobServiceError::MalformedStatusOutput { .. })));
    assert_eq!(record, before, "a failed read must not half-update the record");
    assert_eq!(record.handles().len(), record.states().len());
}

#[tokio::test]
async fn read_re_verifies_every_time() {
    let h = setup();
    let mut record = h.created(&["a"]).await;
    h.service.fail_verify(|| JobServiceError::AuthenticationFailed { stderr: "expired".into() });

    let err = h.lifecycle.read(&h.conn, &mut record).await.unwrap_err();
    assert!(matches!(err.service_error(), Some(JobServiceError::AuthenticationFailed { .. })));
    assert_eq!(h.service.calls(), vec![ServiceCall::Verify]);

    h.service.clear_verify_failure();
    h.lifecycle.read(&h.conn, &mut record).await.unwrap();
}

#[tokio::test]
async fn read_of_deleted_resource_is_not_created() {
    let h = setup();
    let mut record = h.created(&["a"]).await;
    h.lifecycle.delete(&h.conn, &mut record).await.unwrap();
    h.service.clear_calls();

    let err = h.lifecycle.read(&h.conn, &mut record).await.unwrap_err();
    assert!(matches!(err, LifecycleError::NotCreated));
    assert!(h.service.calls().is_empty());
}

#[tokio::test]
async fn read_of_synced_fixture_record() {
    let h = setup();
    let mut record = dj_core::test_support::synced_record(&[
        ("x", JobState::Running),
        ("y", JobState::Pending),
    ]);
    h.service.set_state("x", JobState::Done).set_state("y", JobState::Running);

    h.lifecycle.read(&h.conn, &mut record).await.unwrap();
    assert_eq!(record.states(), &[JobState::Done, JobState::Running]);
}
