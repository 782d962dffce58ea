// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dj show`: print the stored record without contacting the service

use anyhow::Result;
use dj_adapters::JobService;

use super::Context;
use crate::output;

pub fn handle<S: JobService>(ctx: &Context<S>) -> Result<()> {
    let record = ctx.require_record()?;
    output::print_record(ctx.format, &record)
}
