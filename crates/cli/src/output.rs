// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use clap::ValueEnum;
use dj_core::{JobHandle, JobSpec, JobState, ResourceRecord, ResourceStatus};
use serde::Serialize;

use crate::color;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON shape of a resource record.
#[derive(Debug, Serialize)]
pub struct RecordView<'a> {
    pub id: Option<&'a str>,
    pub status: ResourceStatus,
    pub spec: &'a JobSpec,
    pub jobs: Vec<JobView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JobView<'a> {
    pub job_id: &'a JobHandle,
    pub state: JobState,
    pub terminal: bool,
}

impl<'a> From<&'a ResourceRecord> for RecordView<'a> {
    fn from(record: &'a ResourceRecord) -> Self {
        Self {
            id: record.id(),
            status: record.status(),
            spec: record.spec(),
            jobs: record
                .jobs()
                .map(|(job_id, state)| JobView { job_id, state, terminal: state.is_terminal() })
                .collect(),
        }
    }
}

/// Human-readable record summary followed by a job table.
pub fn render_record(record: &ResourceRecord, out: &mut dyn Write) -> std::io::Result<()> {
    let spec = record.spec();
    let name = record.id().unwrap_or(spec.name());
    writeln!(out, "{} {}", color::header(name), color::muted(&format!("({})", record.status())))?;
    writeln!(out, "  {} {}", color::context("project: "), spec.project())?;
    writeln!(out, "  {} {}", color::context("artifact:"), spec.artifact_location())?;
    writeln!(out, "  {} {}", color::context("entry:   "), spec.entry_point())?;
    writeln!(out, "  {} {}", color::context("staging: "), spec.staging_location())?;

    if record.handles().is_empty() {
        return Ok(());
    }
    let width = record.handles().iter().map(|h| h.as_str().len()).max().unwrap_or(0).max(6);
    writeln!(out)?;
    writeln!(out, "{:<width$}  {}", "JOB ID", "STATE")?;
    if record.states().is_empty() {
        for handle in record.handles() {
            writeln!(out, "{:<width$}  {}", handle.as_str(), color::muted("-"))?;
        }
    } else {
        for (handle, state) in record.jobs() {
            writeln!(out, "{:<width$}  {}", handle.as_str(), color::state(state))?;
        }
    }
    Ok(())
}

/// Print `record` in the requested format.
pub fn print_record(format: OutputFormat, record: &ResourceRecord) -> anyhow::Result<()> {
    format_or_json(format, &RecordView::from(record), || {
        let mut stdout = std::io::stdout().lock();
        render_record(record, &mut stdout)
    })
}

/// Format-branch helper for single-object output.
///
/// Renders as JSON when `format` is `Json`, otherwise calls `text_fn`.
pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    data: &T,
    text_fn: impl FnOnce() -> std::io::Result<()>,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Text => {
            text_fn()?;
        }
    }
    Ok(())
}
