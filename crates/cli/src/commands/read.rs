// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dj read`: refresh job states from the service

use anyhow::Result;
use dj_adapters::JobService;

use super::{lifecycle_error, Context};
use crate::output;

pub async fn handle<S: JobService>(ctx: &Context<S>) -> Result<()> {
    let mut record = ctx.require_record()?;
    let conn = ctx.conn_for(&record);

    // A failed read leaves the record untouched, so nothing to persist.
    ctx.lifecycle.read(&conn, &mut record).await.map_err(lifecycle_error)?;
    ctx.state.save(&record)?;
    output::print_record(ctx.format, &record)
}
