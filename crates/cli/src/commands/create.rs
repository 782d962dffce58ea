// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dj create`: submit a job and record its handles

use anyhow::Result;
use clap::Args;
use dj_adapters::JobService;
use dj_core::{JobSpec, JobSpecError};

use super::{lifecycle_error, Context};
use crate::exit_error::ExitError;
use crate::output;

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Job name: lowercase letters, digits and '-', starting with a letter
    #[arg(long)]
    pub name: String,

    /// Bundled pipeline artifact passed to the launcher's classpath
    #[arg(long, value_name = "PATH")]
    pub artifact: String,

    /// Main class of the pipeline
    #[arg(long, value_name = "CLASS")]
    pub entry_point: String,

    /// Storage location the launcher stages files to (e.g. gs://bucket/staging)
    #[arg(long, value_name = "URL")]
    pub staging_location: String,

    /// Project to run in (overrides DJ_PROJECT and the config file)
    #[arg(long)]
    pub project: Option<String>,
}

pub async fn handle<S: JobService>(ctx: &Context<S>, args: CreateArgs) -> Result<()> {
    if let Some(existing) = ctx.state.load()? {
        if let Some(id) = existing.id() {
            return Err(ExitError::new(
                ExitError::FAILURE,
                format!(
                    "resource '{id}' already exists in {}; run `dj delete` first",
                    ctx.state.path().display()
                ),
            )
            .into());
        }
    }

    let spec = JobSpec::new(
        args.name,
        args.artifact,
        args.entry_point,
        ctx.conn.project.clone(),
        args.staging_location,
    )
    .map_err(|e| match e {
        JobSpecError::Empty { field: "project" } => ExitError::usage(
            "no project configured: pass --project, set DJ_PROJECT or [connection].project",
        ),
        other => ExitError::usage(other.to_string()),
    })?;

    let record = ctx.lifecycle.create(&ctx.conn, spec).await.map_err(lifecycle_error)?;
    ctx.state.save(&record)?;
    output::print_record(ctx.format, &record)
}
