// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fluent helpers for driving the `dj` binary.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Path to the `dj` binary, built on first use.
///
/// The root package does not own the binary, so cargo only sets
/// `CARGO_BIN_EXE_dj` for the cli crate's own tests. The binary lands next to
/// this test executable's `deps/` directory.
fn dj_binary() -> &'static Path {
    static BINARY: OnceLock<PathBuf> = OnceLock::new();
    BINARY.get_or_init(|| {
        let deps = std::env::current_exe().unwrap().parent().unwrap().to_path_buf();
        let profile_dir = deps.parent().unwrap();
        let binary = profile_dir.join(format!("dj{}", std::env::consts::EXE_SUFFIX));

        let cargo = std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into());
        let mut build = std::process::Command::new(cargo);
        build.current_dir(env!("CARGO_MANIFEST_DIR")).args(["build", "--quiet", "-p", "dj", "--bin", "dj"]);
        if profile_dir.file_name().is_some_and(|name| name == "release") {
            build.arg("--release");
        }
        if let Some(target_dir) = profile_dir.parent() {
            build.arg("--target-dir").arg(target_dir);
        }
        let status = build.status().unwrap();
        assert!(status.success(), "building dj failed: {status}");
        assert!(binary.exists(), "dj binary missing at {}", binary.display());
        binary
    })
}

/// Command for the binary outside any project (help, version).
pub fn cli() -> CliBuilder {
    CliBuilder::new(None)
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    fn new(project: Option<&Project>) -> Self {
        let mut cmd = Command::new(dj_binary());
        for var in ["DJ_CONFIG", "DJ_PROJECT", "DJ_CREDENTIALS", "DJ_STATE_FILE", "DJ_LOG", "COLOR"] {
            cmd.env_remove(var);
        }
        cmd.env("NO_COLOR", "1");
        if let Some(project) = project {
            cmd.current_dir(project.path()).env("PATH", project.bin_dir());
        }
        Self { cmd }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    fn run(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        RunAssert { output }
    }

    /// Run and assert exit code 0.
    pub fn passes(self) -> RunAssert {
        let run = self.run();
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            run.output.status.code(),
            run.stdout(),
            run.stderr()
        );
        run
    }

    /// Run and assert a specific nonzero exit code.
    pub fn exits(self, code: i32) -> RunAssert {
        let run = self.run();
        assert_eq!(
            run.output.status.code(),
            Some(code),
            "unexpected exit code\nstdout:\n{}\nstderr:\n{}",
            run.stdout(),
            run.stderr()
        );
        run
    }

    /// Run and assert failure with any code.
    pub fn fails(self) -> RunAssert {
        let run = self.run();
        assert!(!run.output.status.success(), "expected failure\nstdout:\n{}", run.stdout());
        run
    }
}

pub struct RunAssert {
    output: std::process::Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(needle), "stdout missing {needle:?}:\n{stdout}");
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(!stdout.contains(needle), "stdout unexpectedly has {needle:?}:\n{stdout}");
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(needle), "stderr missing {needle:?}:\n{stderr}");
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        assert_eq!(self.stdout(), expected);
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).unwrap()
    }
}

/// Temp working directory with its own PATH.
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// Project whose PATH is empty: no job tools are installed.
    pub fn empty() -> Self {
        let project = Self { dir: tempfile::tempdir().unwrap() };
        std::fs::create_dir_all(project.bin_dir()).unwrap();
        project
    }

    /// Project with fake `gcloud` and `java` on PATH.
    pub fn with_tools() -> Self {
        let project = Self::empty();
        let remote = project.remote_dir();
        std::fs::create_dir_all(remote.join("jobs")).unwrap();
        std::fs::create_dir_all(remote.join("soft_fail")).unwrap();
        std::fs::create_dir_all(remote.join("hard_fail")).unwrap();
        let remote = remote.display().to_string();
        project.script("gcloud", &FAKE_GCLOUD.replace("{remote}", &remote));
        project.script("java", &FAKE_JAVA.replace("{remote}", &remote));
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.path().join("bin")
    }

    fn remote_dir(&self) -> PathBuf {
        self.path().join("remote")
    }

    pub fn file(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path().join(rel).exists()
    }

    #[cfg(unix)]
    fn script(&self, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = self.bin_dir().join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    pub fn dj(&self) -> CliBuilder {
        CliBuilder::new(Some(self))
    }

    /// `dj create` with a valid spec for `name`.
    pub fn create(&self, name: &str) -> CliBuilder {
        self.dj().args(&[
            "create",
            "--name",
            name,
            "--artifact",
            "/opt/pipelines/wordcount-bundled.jar",
            "--entry-point",
            "com.example.WordCount",
            "--staging-location",
            "gs://test-bucket/staging",
            "--project",
            "test-project",
        ])
    }

    // ── fake service controls ───────────────────────────────────────────

    /// Identifiers the next launcher run announces.
    pub fn submits(&self, ids: &[&str]) {
        let lines: String = ids.iter().map(|id| format!("{id}\n")).collect();
        std::fs::write(self.remote_dir().join("submit_ids"), lines).unwrap();
    }

    pub fn set_job_state(&self, id: &str, state: &str) {
        std::fs::write(self.remote_dir().join("jobs").join(id), format!("{state}\n")).unwrap();
    }

    pub fn job_state(&self, id: &str) -> String {
        std::fs::read_to_string(self.remote_dir().join("jobs").join(id)).unwrap().trim().to_string()
    }

    pub fn soft_fail_cancel(&self, id: &str, on: bool) {
        self.flag(&format!("soft_fail/{id}"), on);
    }

    pub fn hard_fail_cancel(&self, id: &str) {
        self.flag(&format!("hard_fail/{id}"), true);
    }

    pub fn fail_auth(&self) {
        self.flag("auth_fail", true);
    }

    pub fn remove_feature(&self) {
        self.flag("no_feature", true);
    }

    pub fn fail_submit(&self) {
        self.flag("submit_fail", true);
    }

    fn flag(&self, rel: &str, on: bool) {
        let path = self.remote_dir().join(rel);
        if on {
            std::fs::write(path, "").unwrap();
        } else {
            let _ = std::fs::remove_file(path);
        }
    }

    /// Every fake tool invocation so far, one per line.
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.remote_dir().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn calls_starting(&self, prefix: &str) -> Vec<String> {
        self.calls().into_iter().filter(|c| c.starts_with(prefix)).collect()
    }

    pub fn clear_calls(&self) {
        let _ = std::fs::remove_file(self.remote_dir().join("calls.log"));
    }

    /// Copy of the last key file passed to `auth activate-service-account`.
    pub fn last_key(&self) -> Option<String> {
        std::fs::read_to_string(self.remote_dir().join("last_key")).ok()
    }
}

const FAKE_GCLOUD: &str = r#"#!/bin/sh
PATH=/usr/bin:/bin:$PATH
FAKE="{remote}"
echo "gcloud $*" >> "$FAKE/calls.log"

if [ "$1" = auth ]; then
    if [ -f "$FAKE/auth_fail" ]; then
        echo "ERROR: (gcloud.auth.activate-service-account) invalid key file" >&2
        exit 1
    fi
    cp "$4" "$FAKE/last_key"
    echo "Activated service account credentials" >&2
    exit 0
fi

if [ "$1" != alpha ] || [ "$2" != dataflow ]; then
    echo "ERROR: unknown command" >&2
    exit 2
fi
shift 2

if [ "$1" = "--help" ]; then
    if [ -f "$FAKE/no_feature" ]; then
        echo "ERROR: (gcloud.alpha) Invalid choice: 'dataflow'" >&2
        exit 2
    fi
    echo "NAME"
    echo "    gcloud alpha dataflow - read and manipulate Google Dataflow resources"
    exit 0
fi

id="$3"
state_file="$FAKE/jobs/$id"
case "$2" in
    describe)
        if [ ! -f "$state_file" ]; then
            echo "ERROR: (gcloud.alpha.dataflow.jobs.describe) NOT_FOUND: job $id" >&2
            exit 1
        fi
        printf '{\n  "id": "%s",\n  "currentState": "%s",\n  "type": "JOB_TYPE_BATCH"\n}\n' "$id" "$(cat "$state_file")"
        ;;
    cancel)
        if [ -f "$FAKE/hard_fail/$id" ]; then
            echo "ERROR: (gcloud.alpha.dataflow.jobs.cancel) PERMISSION_DENIED" >&2
            exit 1
        fi
        if [ -f "$FAKE/soft_fail/$id" ]; then
            echo "Failed to cancel job [$id]: job is not in a cancellable state"
            exit 0
        fi
        echo JOB_STATE_CANCELLED > "$state_file"
        echo "Cancelled job [$id]"
        ;;
    *)
        exit 2
        ;;
esac
"#;

const FAKE_JAVA: &str = r#"#!/bin/sh
PATH=/usr/bin:/bin:$PATH
FAKE="{remote}"
echo "java $*" >> "$FAKE/calls.log"

if [ -f "$FAKE/submit_fail" ]; then
    echo "Exception in thread \"main\" java.lang.RuntimeException: Failed to stage files" >&2
    exit 1
fi

echo "Executing pipeline on the Dataflow Service"
if [ -f "$FAKE/submit_ids" ]; then
    while read -r id; do
        [ -n "$id" ] || continue
        echo JOB_STATE_RUNNING > "$FAKE/jobs/$id"
        echo "Submitted job: $id"
    done < "$FAKE/submit_ids"
fi
"#;
