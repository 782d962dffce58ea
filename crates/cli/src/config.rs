// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dj.toml` loading.
//!
//! Lookup order: `--config`, then `DJ_CONFIG`, then `./dj.toml` if it
//! exists, then built-in defaults. Every key is optional.

use dj_adapters::{Timeouts, ToolConfig};
use dj_core::Connection;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::env;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("invalid config {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("invalid config {}: timeouts.{field} must be greater than zero", path.display())]
    ZeroTimeout { path: PathBuf, field: &'static str },

    #[error("invalid config {}: tools.{field} must not be empty", path.display())]
    EmptyTool { path: PathBuf, field: &'static str },
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub connection: ConnectionSection,
    pub tools: ToolsSection,
    pub timeouts: TimeoutsSection,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionSection {
    pub project: Option<String>,
    /// Inline service-account JSON or a key file path.
    pub credentials: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsSection {
    pub cli: Option<String>,
    pub launcher: Option<String>,
    pub command_group: Option<Vec<String>>,
    pub runner: Option<String>,
}

/// Timeouts in milliseconds.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutsSection {
    pub verify_ms: Option<u64>,
    pub submit_ms: Option<u64>,
    pub poll_ms: Option<u64>,
    pub cancel_ms: Option<u64>,
}

impl Config {
    /// Locate and load the config file, or return defaults if there is none.
    ///
    /// An explicitly named file (flag or env) must exist.
    pub fn load(flag: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = flag.map(Path::to_path_buf).or_else(env::config_path);
        let path = match explicit {
            Some(path) => path,
            None => {
                let fallback = PathBuf::from(env::DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = std::fs::read_to_string(&path)
            .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        let config = Self::parse(&path, &text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let t = &self.timeouts;
        for (field, value) in [
            ("verify_ms", t.verify_ms),
            ("submit_ms", t.submit_ms),
            ("poll_ms", t.poll_ms),
            ("cancel_ms", t.cancel_ms),
        ] {
            if value == Some(0) {
                return Err(ConfigError::ZeroTimeout { path: path.to_path_buf(), field });
            }
        }

        let tools = &self.tools;
        for (field, value) in [
            ("cli", &tools.cli),
            ("launcher", &tools.launcher),
            ("runner", &tools.runner),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ConfigError::EmptyTool { path: path.to_path_buf(), field });
            }
        }
        if tools.command_group.as_ref().is_some_and(|g| g.is_empty()) {
            return Err(ConfigError::EmptyTool { path: path.to_path_buf(), field: "command_group" });
        }
        Ok(())
    }

    /// Tool settings with unset keys left at their defaults.
    pub fn tool_config(&self) -> ToolConfig {
        let defaults = ToolConfig::default();
        let t = &self.timeouts;
        let ms = |value: Option<u64>, default: Duration| value.map(Duration::from_millis).unwrap_or(default);
        let timeouts = Timeouts {
            verify: ms(t.verify_ms, defaults.timeouts.verify),
            submit: ms(t.submit_ms, defaults.timeouts.submit),
            poll: ms(t.poll_ms, defaults.timeouts.poll),
            cancel: ms(t.cancel_ms, defaults.timeouts.cancel),
        };

        let tools = self.tools.clone();
        ToolConfig {
            cli: tools.cli.unwrap_or(defaults.cli),
            launcher: tools.launcher.unwrap_or(defaults.launcher),
            command_group: tools.command_group.unwrap_or(defaults.command_group),
            runner: tools.runner.unwrap_or(defaults.runner),
            timeouts,
        }
    }

    /// Connection context. Precedence: flag, then environment, then file.
    pub fn connection(&self, project_flag: Option<&str>) -> Connection {
        let project = project_flag
            .map(str::to_string)
            .or_else(env::project)
            .or_else(|| self.connection.project.clone())
            .unwrap_or_default();
        let mut conn = Connection::new(project);
        if let Some(credentials) = env::credentials().or_else(|| self.connection.credentials.clone()) {
            conn = conn.with_credentials(credentials);
        }
        conn
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
