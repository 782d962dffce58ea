// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn record(ids: &[&str]) -> ResourceRecord {
    let handles = ids.iter().map(|id| JobHandle::new(*id)).collect();
    ResourceRecord::submitted(JobSpec::builder().name("etl").build(), handles)
}

#[test]
fn submitted_record_is_identified_by_job_name() {
    let rec = record(&["a"]);
    assert_eq!(rec.id(), Some("etl"));
    assert_eq!(rec.status(), ResourceStatus::Submitted);
    assert!(rec.states().is_empty());
    assert!(rec.is_live());
}

#[test]
fn set_states_aligns_and_syncs() {
    let mut rec = record(&["a", "b"]);
    rec.set_states(vec![JobState::Running, JobState::Done]).unwrap();
    assert_eq!(rec.status(), ResourceStatus::Synced);
    assert_eq!(rec.handles().len(), rec.states().len());
}

#[yare::parameterized(
    too_few  = { &[JobState::Running] },
    too_many = { &[JobState::Running, JobState::Done, JobState::Done] },
    empty    = { &[] },
)]
fn set_states_rejects_misaligned(states: &[JobState]) {
    let mut rec = record(&["a", "b"]);
    let err = rec.set_states(states.to_vec()).unwrap_err();
    assert_eq!(err, Misaligned { handles: 2, states: states.len() });
    assert!(rec.states().is_empty(), "rejected states must not be recorded");
    assert_eq!(rec.status(), ResourceStatus::Submitted);
}

#[test]
fn set_states_keeps_deleting_status() {
    let mut rec = record(&["a"]);
    rec.mark_deleting();
    rec.set_states(vec![JobState::Running]).unwrap();
    assert_eq!(rec.status(), ResourceStatus::Deleting);
}

#[test]
fn running_yields_only_running_jobs_in_order() {
    let mut rec = record(&["a", "b", "c", "d"]);
    rec.set_states(vec![JobState::Running, JobState::Done, JobState::Running, JobState::Unknown])
        .unwrap();
    let running: Vec<&str> = rec.running().map(|j| j.handle().as_str()).collect();
    assert_eq!(running, vec!["a", "c"]);
}

#[test]
fn mark_deleted_clears_identifier() {
    let mut rec = record(&["a"]);
    rec.mark_deleted();
    assert_eq!(rec.id(), None);
    assert_eq!(rec.status(), ResourceStatus::Deleted);
    assert!(!rec.is_live());
}

#[test]
fn persisted_record_round_trips() {
    let mut rec = record(&["2015-10-15_20_14_14-4027401809971669184"]);
    rec.set_states(vec![JobState::Running]).unwrap();
    let json = serde_json::to_string_pretty(&rec).unwrap();
    assert!(json.contains("JOB_STATE_RUNNING"));
    assert!(json.contains("\"synced\""));
    let parsed: ResourceRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, rec);
}

#[test]
fn deserialize_rejects_misaligned_synced_record() {
    let json = r#"{
        "id": "etl",
        "status": "synced",
        "spec": {"name":"etl","artifact_location":"a.jar","entry_point":"Main","project":"p","staging_location":"gs://b"},
        "handles": ["a", "b"],
        "states": ["JOB_STATE_RUNNING"]
    }"#;
    assert!(serde_json::from_str::<ResourceRecord>(json).is_err());
}

#[test]
fn deserialize_accepts_unsynced_submitted_record() {
    let json = r#"{
        "id": "etl",
        "status": "submitted",
        "spec": {"name":"etl","artifact_location":"a.jar","entry_point":"Main","project":"p","staging_location":"gs://b"},
        "handles": ["a", "b"]
    }"#;
    let rec: ResourceRecord = serde_json::from_str(json).unwrap();
    assert_eq!(rec.handles().len(), 2);
    assert!(rec.states().is_empty());
}
