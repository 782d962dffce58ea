// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential materialization for tools that only accept a key-file path.
//!
//! A configured credential is either inline service-account JSON or a path
//! to an existing key file:
//!
//! ```text
//! inline JSON object  → written to a private temp file, removed on release
//! anything else       → used as a path, never touched
//! ```
//!
//! The temp file lives exactly as long as the returned guard. Dropping the
//! guard on an early return removes it too.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to write credential file: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to remove credential file {}: {source}", path.display())]
    Remove { path: PathBuf, source: std::io::Error },
}

/// A credential file usable for the duration of one operation.
#[derive(Debug)]
pub enum MaterializedCredential {
    /// Created by [`materialize`]; removed on release or drop.
    Temporary(NamedTempFile),
    /// Caller-owned key file.
    Persistent(PathBuf),
}

impl MaterializedCredential {
    pub fn path(&self) -> &Path {
        match self {
            MaterializedCredential::Temporary(file) => file.path(),
            MaterializedCredential::Persistent(path) => path,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, MaterializedCredential::Temporary(_))
    }

    /// Remove the file if this guard created it.
    pub fn release(self) -> Result<(), CredentialError> {
        match self {
            MaterializedCredential::Temporary(file) => {
                let path = file.path().to_path_buf();
                file.close().map_err(|source| CredentialError::Remove { path, source })
            }
            MaterializedCredential::Persistent(_) => Ok(()),
        }
    }
}

/// Turn a configured credential value into a file path.
pub fn materialize(raw: &str) -> Result<MaterializedCredential, CredentialError> {
    if !is_credential_json(raw) {
        return Ok(MaterializedCredential::Persistent(PathBuf::from(raw)));
    }

    let mut file = tempfile::Builder::new()
        .prefix("dj-credentials-")
        .suffix(".json")
        .tempfile()
        .map_err(CredentialError::Write)?;
    file.write_all(raw.as_bytes()).map_err(CredentialError::Write)?;
    file.flush().map_err(CredentialError::Write)?;
    tracing::debug!(path = %file.path().display(), "materialized inline credentials");
    Ok(MaterializedCredential::Temporary(file))
}

fn is_credential_json(raw: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(raw).map(|v| v.is_object()).unwrap_or(false)
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
