//! Config file and environment specs

use crate::prelude::*;

#[test]
fn project_can_come_from_config_file() {
    let temp = Project::with_tools();
    temp.submits(&["job-1"]);
    temp.file("dj.toml", "[connection]\nproject = \"from-config\"\n");

    temp.dj()
        .args(&[
            "create",
            "--name",
            "wordcount",
            "--artifact",
            "app.jar",
            "--entry-point",
            "Main",
            "--staging-location",
            "gs://b/staging",
        ])
        .passes();
    assert_eq!(temp.calls_starting("java").len(), 1);
    assert!(temp.calls_starting("java")[0].contains("--project=from-config"));
}

#[test]
fn missing_project_is_usage_error_without_tool_calls() {
    let temp = Project::with_tools();
    temp.dj()
        .args(&[
            "create",
            "--name",
            "wordcount",
            "--artifact",
            "app.jar",
            "--entry-point",
            "Main",
            "--staging-location",
            "gs://b/staging",
        ])
        .exits(2)
        .stderr_has("no project configured");
    assert!(temp.calls().is_empty());
}

#[test]
fn invalid_config_is_usage_error() {
    let temp = Project::with_tools();
    temp.file("dj.toml", "[tools]\nshell = \"bash\"\n");
    temp.dj().args(&["show"]).exits(2).stderr_has("dj.toml");
}

#[test]
fn configured_tool_names_are_used() {
    let temp = Project::with_tools();
    std::fs::rename(temp.bin_dir().join("gcloud"), temp.bin_dir().join("gcloud-custom")).unwrap();
    temp.submits(&["job-1"]);
    temp.file("custom.toml", "[tools]\ncli = \"gcloud-custom\"\n");

    temp.create("wordcount").args(&["--config", "custom.toml"]).passes();
}

#[test]
fn inline_credentials_are_activated_then_removed() {
    let temp = Project::with_tools();
    temp.submits(&["job-1"]);
    let key = r#"{"type": "service_account", "project_id": "test-project"}"#;

    temp.create("wordcount").env("DJ_CREDENTIALS", key).passes();

    assert_eq!(temp.last_key().as_deref(), Some(key));
    let auth = &temp.calls_starting("gcloud auth")[0];
    let key_path = auth.rsplit(' ').next().unwrap();
    assert!(!std::path::Path::new(key_path).exists(), "temp key {key_path} left behind");
}

#[test]
fn failed_activation_stops_before_submit() {
    let temp = Project::with_tools();
    temp.submits(&["job-1"]);
    temp.fail_auth();

    temp.create("wordcount")
        .env("DJ_CREDENTIALS", "/etc/dj/account.json")
        .exits(1)
        .stderr_has("credential activation failed")
        .stderr_has("invalid key file");
    assert!(temp.calls_starting("java").is_empty());
    assert!(!temp.exists("dj-state.json"));
}

#[test]
fn state_file_location_follows_flag_and_env() {
    let temp = Project::with_tools();
    temp.submits(&["job-1"]);

    temp.create("wordcount").env("DJ_STATE_FILE", "env-state.json").passes();
    assert!(temp.exists("env-state.json"));

    temp.dj().args(&["show", "--state", "env-state.json"]).passes().stdout_has("job-1");
    temp.dj().args(&["show"]).exits(1).stderr_has("dj-state.json");
}
