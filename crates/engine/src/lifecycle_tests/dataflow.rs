// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle driven through the subprocess-backed service with scripted
//! tool output.

use super::*;
use dj_adapters::{CommandOutput, DataflowService, FakeRunner, ToolConfig};

const DESCRIBE: &[&str] = &["gcloud", "alpha", "dataflow", "jobs", "describe"];
const CANCEL: &[&str] = &["gcloud", "alpha", "dataflow", "jobs", "cancel"];

fn describe(id: &str, state: &str) -> CommandOutput {
    CommandOutput::ok(format!(r#"{{"id":"{id}","currentState":"{state}"}}"#))
}

fn lifecycle(runner: &FakeRunner) -> Lifecycle<DataflowService<FakeRunner>> {
    Lifecycle::new(DataflowService::new(runner.clone(), ToolConfig::default()))
}

const FIRST: &str = "2015-10-15_20_14_14-4027401809971669184";
const SECOND: &str = "2015-10-15_20_14_15-1";

fn for_job<'a>(prefix: &[&'a str], id: &'a str) -> Vec<&'a str> {
    prefix.iter().copied().chain([id]).collect()
}

#[tokio::test]
async fn create_then_delete_with_one_soft_failure() {
    let runner = FakeRunner::new();
    runner.respond(
        &["java"],
        CommandOutput::ok(format!("Submitted job: {FIRST}\nSubmitted job: {SECOND}\n")),
    );
    runner
        .respond(&for_job(DESCRIBE, FIRST), describe(FIRST, "JOB_STATE_RUNNING"))
        .respond(&for_job(DESCRIBE, SECOND), describe(SECOND, "JOB_STATE_RUNNING"))
        .respond(
            &for_job(CANCEL, SECOND),
            CommandOutput::ok(format!("Failed to cancel job [{SECOND}]\n")),
        );
    let lifecycle = lifecycle(&runner);
    let conn = Connection::new("test-project");

    let mut record = lifecycle.create(&conn, JobSpec::builder().build()).await.unwrap();
    assert_eq!(record.handles().len(), 2);
    assert_eq!(record.states(), &[JobState::Running, JobState::Running]);
    // create verifies once: a single feature probe
    assert_eq!(runner.calls_matching(&["gcloud", "alpha", "dataflow", "--help"]).len(), 1);

    let err = lifecycle.delete(&conn, &mut record).await.unwrap_err();
    match err {
        LifecycleError::CancellationIncomplete { job_ids } => {
            assert_eq!(job_ids, handles(&[SECOND]));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(runner.calls_matching(CANCEL).len(), 2);
    assert!(record.is_live());
}

#[tokio::test]
async fn unparseable_describe_fails_read() {
    let runner = FakeRunner::new();
    runner.respond(&["java"], CommandOutput::ok("Submitted job: job-1\n"));
    runner.respond(DESCRIBE, describe("job-1", "JOB_STATE_RUNNING"));
    let lifecycle = lifecycle(&runner);
    let conn = Connection::new("test-project");
    let mut record = lifecycle.create(&conn, JobSpec::builder().build()).await.unwrap();

    runner.respond(&for_job(DESCRIBE, "job-1"), CommandOutput::ok("WARNING: not json"));
    let err = lifecycle.read(&conn, &mut record).await.unwrap_err();
    assert!(matches!(
        err.service_error(),
        Some(JobServiceError::MalformedStatusOutput { .. })
    ));
    assert_eq!(record.states(), &[JobState::Running]);
}
