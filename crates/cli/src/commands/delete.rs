// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dj delete`: cancel running jobs and forget the resource

use anyhow::Result;
use dj_adapters::JobService;
use serde::Serialize;

use super::{lifecycle_error, Context};
use crate::color;
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct Deleted<'a> {
    id: &'a str,
    deleted: bool,
}

pub async fn handle<S: JobService>(ctx: &Context<S>) -> Result<()> {
    let Some(mut record) = ctx.state.load()? else {
        if ctx.format == OutputFormat::Text {
            println!("Nothing to delete");
        }
        return Ok(());
    };
    let id = record.id().unwrap_or(record.spec().name()).to_string();
    let conn = ctx.conn_for(&record);

    if let Err(err) = ctx.lifecycle.delete(&conn, &mut record).await {
        // Keep the refreshed states and the identifier for the retry.
        ctx.state.save(&record)?;
        if ctx.format == OutputFormat::Text && !record.states().is_empty() {
            output::print_record(ctx.format, &record)?;
        }
        return Err(lifecycle_error(err));
    }

    ctx.state.remove()?;
    output::format_or_json(ctx.format, &Deleted { id: &id, deleted: true }, || {
        println!("Deleted {}", color::header(&id));
        Ok(())
    })
}
