// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;

/// Default state file, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = "dj-state.json";

/// Config file picked up from the working directory when nothing else is set.
pub const DEFAULT_CONFIG_FILE: &str = "dj.toml";

/// Log filter used when `DJ_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Config file path from `DJ_CONFIG`.
pub fn config_path() -> Option<PathBuf> {
    non_empty("DJ_CONFIG").map(PathBuf::from)
}

/// Project override from `DJ_PROJECT`.
pub fn project() -> Option<String> {
    non_empty("DJ_PROJECT")
}

/// Credential override from `DJ_CREDENTIALS` (inline JSON or key file path).
pub fn credentials() -> Option<String> {
    non_empty("DJ_CREDENTIALS")
}

/// Resolve state file: `--state` > `DJ_STATE_FILE` > `./dj-state.json`
pub fn state_file(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| non_empty("DJ_STATE_FILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE))
}

/// Tracing filter directive from `DJ_LOG`.
pub fn log_filter() -> String {
    non_empty("DJ_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// `NO_COLOR=1` disables color.
pub fn no_color() -> bool {
    std::env::var("NO_COLOR").is_ok_and(|v| v == "1")
}

/// `COLOR=1` forces color even when stdout is not a terminal.
pub fn force_color() -> bool {
    std::env::var("COLOR").is_ok_and(|v| v == "1")
}
