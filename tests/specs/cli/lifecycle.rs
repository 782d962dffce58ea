//! Create / read / delete specs against the fake job service

use crate::prelude::*;

#[test]
fn create_records_every_submitted_job() {
    let temp = Project::with_tools();
    temp.submits(&["2015-10-15_20_14_14-4027401809971669184", "2015-10-15_20_14_15-1"]);

    temp.create("wordcount")
        .passes()
        .stdout_has("wordcount (synced)")
        .stdout_has("2015-10-15_20_14_14-4027401809971669184  running");

    let state: serde_json::Value = serde_json::from_str(&temp.read("dj-state.json")).unwrap();
    assert_eq!(state["id"], "wordcount");
    assert_eq!(
        state["handles"],
        serde_json::json!(["2015-10-15_20_14_14-4027401809971669184", "2015-10-15_20_14_15-1"])
    );
    assert_eq!(state["states"], serde_json::json!(["JOB_STATE_RUNNING", "JOB_STATE_RUNNING"]));
}

#[test]
fn create_passes_spec_to_launcher() {
    let temp = Project::with_tools();
    temp.submits(&["job-1"]);
    temp.create("wordcount").passes();

    assert_eq!(temp.calls_starting("java"), vec![
        "java -cp /opt/pipelines/wordcount-bundled.jar com.example.WordCount \
         --project=test-project --stagingLocation=gs://test-bucket/staging \
         --jobName=wordcount --runner=DataflowPipelineRunner"
            .to_string()
    ]);
}

#[test]
fn create_verifies_once_then_polls() {
    let temp = Project::with_tools();
    temp.submits(&["job-1"]);
    temp.create("wordcount").passes();

    assert_eq!(temp.calls(), vec![
        "gcloud alpha dataflow --help".to_string(),
        "java -cp /opt/pipelines/wordcount-bundled.jar com.example.WordCount --project=test-project --stagingLocation=gs://test-bucket/staging --jobName=wordcount --runner=DataflowPipelineRunner".to_string(),
        "gcloud alpha dataflow jobs describe job-1 --format json --project=test-project".to_string(),
    ]);
}

#[test]
fn create_without_job_ids_fails_and_shows_launcher_output() {
    let temp = Project::with_tools();
    temp.create("wordcount")
        .exits(1)
        .stderr_has("printed no job identifiers")
        .stderr_has("Executing pipeline on the Dataflow Service");
    assert!(!temp.exists("dj-state.json"));
}

#[test]
fn create_reports_launcher_stderr() {
    let temp = Project::with_tools();
    temp.fail_submit();
    temp.create("wordcount").exits(1).stderr_has("Failed to stage files");
}

#[test]
fn create_without_tools_is_not_installed() {
    let temp = Project::empty();
    temp.create("wordcount").exits(1).stderr_has("`gcloud` is not installed");
}

#[test]
fn create_without_job_feature_is_unavailable() {
    let temp = Project::with_tools();
    temp.remove_feature();
    temp.create("wordcount")
        .exits(1)
        .stderr_has("gcloud alpha dataflow")
        .stderr_has("Invalid choice");
    assert!(temp.calls_starting("java").is_empty());
}

#[test]
fn create_twice_is_refused() {
    let temp = Project::with_tools();
    temp.submits(&["job-1"]);
    temp.create("wordcount").passes();
    temp.create("wordcount").exits(1).stderr_has("already exists");
}

#[test]
fn invalid_job_name_is_usage_error() {
    let temp = Project::with_tools();
    temp.create("Word_Count").exits(2).stderr_has("invalid job name");
    assert!(temp.calls().is_empty());
}

#[test]
fn read_refreshes_states() {
    let temp = Project::with_tools();
    temp.submits(&["job-1", "job-2"]);
    temp.create("wordcount").passes();
    temp.set_job_state("job-1", "JOB_STATE_DONE");
    temp.set_job_state("job-2", "JOB_STATE_FAILED");

    let run = temp.dj().args(&["read", "-o", "json"]).passes();
    let json = run.json();
    assert_eq!(json["jobs"][0]["state"], "JOB_STATE_DONE");
    assert_eq!(json["jobs"][1]["state"], "JOB_STATE_FAILED");
    assert_eq!(json["jobs"][1]["terminal"], true);

    temp.dj().args(&["show"]).passes().stdout_has("job-2   failed");
}

#[test]
fn repeated_reads_are_identical() {
    let temp = Project::with_tools();
    temp.submits(&["job-1"]);
    temp.create("wordcount").passes();

    let first = temp.dj().args(&["read", "-o", "json"]).passes().stdout();
    let second = temp.dj().args(&["read", "-o", "json"]).passes().stdout();
    assert_eq!(first, second);
}

#[test]
fn read_fails_whole_when_a_job_cannot_be_described() {
    let temp = Project::with_tools();
    temp.submits(&["job-1", "job-2"]);
    temp.create("wordcount").passes();
    let before = temp.read("dj-state.json");
    std::fs::remove_file(temp.path().join("remote/jobs/job-1")).unwrap();
    temp.clear_calls();

    temp.dj().args(&["read"]).exits(1).stderr_has("failed to poll job job-1").stderr_has("NOT_FOUND");
    assert_eq!(temp.read("dj-state.json"), before);
    assert!(temp.calls_starting("gcloud alpha dataflow jobs describe job-2").is_empty());
}

#[test]
fn unknown_service_state_is_reported_as_unknown() {
    let temp = Project::with_tools();
    temp.submits(&["job-1"]);
    temp.create("wordcount").passes();
    temp.set_job_state("job-1", "JOB_STATE_DRAINING");

    temp.dj().args(&["read"]).passes().stdout_has("job-1   unknown");
}

#[test]
fn show_needs_no_tools() {
    let temp = Project::with_tools();
    temp.submits(&["job-1"]);
    temp.create("wordcount").passes();
    temp.clear_calls();

    temp.dj().args(&["show", "-o", "json"]).passes().stdout_has("\"job_id\": \"job-1\"");
    assert!(temp.calls().is_empty());
}

#[test]
fn delete_cancels_running_jobs_only() {
    let temp = Project::with_tools();
    temp.submits(&["job-1", "job-2"]);
    temp.create("wordcount").passes();
    temp.set_job_state("job-1", "JOB_STATE_DONE");
    temp.clear_calls();

    temp.dj().args(&["delete"]).passes().stdout_eq("Deleted wordcount\n");

    assert_eq!(temp.calls_starting("gcloud alpha dataflow jobs cancel"), vec![
        "gcloud alpha dataflow jobs cancel job-2 --project=test-project".to_string()
    ]);
    assert_eq!(temp.job_state("job-1"), "JOB_STATE_DONE");
    assert_eq!(temp.job_state("job-2"), "JOB_STATE_CANCELLED");
    assert!(!temp.exists("dj-state.json"));
}

#[test]
fn soft_cancel_failure_exits_3_and_retry_finishes() {
    let temp = Project::with_tools();
    temp.submits(&["job-1", "job-2"]);
    temp.create("wordcount").passes();
    temp.soft_fail_cancel("job-1", true);

    temp.dj()
        .args(&["delete"])
        .exits(3)
        .stderr_has("cancellation incomplete for job(s): job-1")
        .stderr_has("dj delete");

    let state: serde_json::Value = serde_json::from_str(&temp.read("dj-state.json")).unwrap();
    assert_eq!(state["id"], "wordcount");
    assert_eq!(state["status"], "deleting");
    assert_eq!(temp.job_state("job-2"), "JOB_STATE_CANCELLED");

    temp.soft_fail_cancel("job-1", false);
    temp.clear_calls();
    temp.dj().args(&["delete"]).passes();

    assert_eq!(temp.calls_starting("gcloud alpha dataflow jobs cancel"), vec![
        "gcloud alpha dataflow jobs cancel job-1 --project=test-project".to_string()
    ]);
    assert!(!temp.exists("dj-state.json"));
}

#[test]
fn hard_cancel_failure_keeps_resource() {
    let temp = Project::with_tools();
    temp.submits(&["job-1", "job-2"]);
    temp.create("wordcount").passes();
    temp.hard_fail_cancel("job-1");

    temp.dj().args(&["delete"]).exits(1).stderr_has("PERMISSION_DENIED");
    assert!(temp.calls_starting("gcloud alpha dataflow jobs cancel job-2").is_empty());
    assert!(temp.read("dj-state.json").contains("\"id\": \"wordcount\""));
}

#[test]
fn delete_without_state_is_a_no_op() {
    let temp = Project::with_tools();
    temp.dj().args(&["delete"]).passes().stdout_eq("Nothing to delete\n");
    assert!(temp.calls().is_empty());
}
