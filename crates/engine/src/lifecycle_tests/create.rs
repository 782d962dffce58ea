// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn create_verifies_submits_then_polls_each_job() {
    let h = setup();
    h.service.submit_returns(&["job-1", "job-2"]);

    let record = h.lifecycle.create(&h.conn, JobSpec::builder().build()).await.unwrap();

    assert_eq!(record.id(), Some("wordcount"));
    assert_eq!(record.status(), ResourceStatus::Synced);
    assert_eq!(record.handles(), handles(&["job-1", "job-2"]).as_slice());
    assert_eq!(record.states(), &[JobState::Running, JobState::Running]);
    assert_eq!(h.service.calls(), vec![
        ServiceCall::Verify,
        ServiceCall::Submit("wordcount".into()),
        ServiceCall::Poll("job-1".into()),
        ServiceCall::Poll("job-2".into()),
    ]);
}

#[tokio::test]
async fn create_aborts_when_verification_fails() {
    let h = setup();
    h.service
        .submit_returns(&["job-1"])
        .fail_verify(|| JobServiceError::ToolNotInstalled { tool: "gcloud".into() });

    let err = h.lifecycle.create(&h.conn, JobSpec::builder().build()).await.unwrap_err();
    assert!(matches!(
        err.service_error(),
        Some(JobServiceError::ToolNotInstalled { .. })
    ));
    assert_eq!(h.service.calls(), vec![ServiceCall::Verify]);
}

#[yare::parameterized(
    submission_failed = { || JobServiceError::SubmissionFailed { stderr: "boom".into() } },
    no_identifiers = { || JobServiceError::NoJobIdentifiersFound { stdout: String::new(), stderr: String::new() } },
)]
#[test_macro(tokio::test)]
async fn create_surfaces_submit_errors(err: fn() -> JobServiceError) {
    let h = setup();
    h.service.fail_submit(err);

    let result = h.lifecycle.create(&h.conn, JobSpec::builder().build()).await;
    assert!(matches!(result, Err(LifecycleError::Service(_))));
    assert!(!h.service.calls().iter().any(|c| matches!(c, ServiceCall::Poll(_))));
}

#[tokio::test]
async fn create_fails_whole_when_one_poll_fails() {
    let h = setup();
    h.service.submit_returns(&["job-1", "job-2"]).fail_poll("job-1", || {
        JobServiceError::PollFailed { job_id: "job-1".into(), stderr: "INTERNAL".into() }
    });

    let err = h.lifecycle.create(&h.conn, JobSpec::builder().build()).await.unwrap_err();
    assert!(matches!(err.service_error(), Some(JobServiceError::PollFailed { .. })));
    // job-2 is never polled
    assert_eq!(h.service.calls().last(), Some(&ServiceCall::Poll("job-1".into())));
}

#[tokio::test]
async fn create_verifies_exactly_once() {
    let h = setup();
    h.service.submit_returns(&["a", "b", "c"]);
    h.lifecycle.create(&h.conn, JobSpec::builder().build()).await.unwrap();

    let verifies = h.service.calls().into_iter().filter(|c| *c == ServiceCall::Verify).count();
    assert_eq!(verifies, 1);
}
