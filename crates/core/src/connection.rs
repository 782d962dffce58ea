// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection context passed into every lifecycle operation.

/// Project and credentials for one operation against the job service.
///
/// `credentials` holds either inline service-account JSON or a path to a key
/// file; `None` means the CLI's ambient login is used as-is.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Connection {
    pub project: String,
    pub credentials: Option<String>,
}

impl Connection {
    pub fn new(project: impl Into<String>) -> Self {
        Self { project: project.into(), credentials: None }
    }

    pub fn with_credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }
}

// Credentials may be inline key material and must never reach logs.
impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("project", &self.project)
            .field("credentials", &self.credentials.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
