// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource record persistence.
//!
//! The record is stored as pretty JSON. Writes go to a sibling temp file
//! first and are renamed into place, so a crash never leaves a torn record.

use dj_core::ResourceRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("corrupt state file {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("failed to write state file {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
}

/// On-disk home of one resource record.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored record, or `None` if there is no state file.
    pub fn load(&self) -> Result<Option<ResourceRecord>, StateError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StateError::Read { path: self.path.clone(), source }),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StateError::Parse { path: self.path.clone(), source })
    }

    pub fn save(&self, record: &ResourceRecord) -> Result<(), StateError> {
        let write_err = |source| StateError::Write { path: self.path.clone(), source };
        let tmp_path = self.path.with_extension("json.tmp");

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(write_err)?;
        }
        let mut json = serde_json::to_string_pretty(record).map_err(std::io::Error::other).map_err(write_err)?;
        json.push('\n');
        std::fs::write(&tmp_path, json.as_bytes()).map_err(write_err)?;
        std::fs::rename(&tmp_path, &self.path).map_err(write_err)?;
        tracing::debug!(path = %self.path.display(), status = %record.status(), "saved state");
        Ok(())
    }

    /// Remove the state file. Missing is fine.
    pub fn remove(&self) -> Result<(), StateError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StateError::Write { path: self.path.clone(), source }),
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
