// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dj: create, read and delete remote batch jobs as one resource

mod color;
mod commands;
mod config;
mod env;
mod exit_error;
mod output;
mod state;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dj_adapters::{DataflowService, SystemRunner};
use dj_engine::Lifecycle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::commands::create::CreateArgs;
use crate::commands::Context;
use crate::config::Config;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;
use crate::state::StateFile;

#[derive(Parser)]
#[command(
    name = "dj",
    version,
    about = "Manage remote batch jobs as a single resource",
    styles = color::styles()
)]
struct Cli {
    /// Config file (default: DJ_CONFIG, then ./dj.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Resource state file (default: DJ_STATE_FILE, then ./dj-state.json)
    #[arg(long, global = true, value_name = "PATH")]
    state: Option<PathBuf>,

    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a job and record the handles it reports
    Create(CreateArgs),
    /// Refresh the state of every recorded job
    Read,
    /// Cancel running jobs and remove the resource
    Delete,
    /// Print the recorded resource without contacting the service
    Show,
}

fn init_logging() {
    let filter = EnvFilter::try_new(env::log_filter())
        .unwrap_or_else(|_| EnvFilter::new(env::DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let code = err.downcast_ref::<ExitError>().map_or(ExitError::FAILURE, |e| e.code);
        eprintln!("error: {err:#}");
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config =
        Config::load(cli.config.as_deref()).map_err(|e| ExitError::usage(e.to_string()))?;
    let project_flag = match &cli.command {
        Commands::Create(args) => args.project.as_deref(),
        _ => None,
    };
    let conn = config.connection(project_flag);
    tracing::debug!(?conn, "resolved connection");

    // Ctrl-C kills whichever tool invocation is in flight.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted");
            on_interrupt.cancel();
        }
    });

    let service = DataflowService::new(SystemRunner::with_cancel(cancel), config.tool_config());
    let ctx = Context {
        lifecycle: Lifecycle::new(service),
        conn,
        state: StateFile::new(env::state_file(cli.state)),
        format: cli.output,
    };

    match cli.command {
        Commands::Create(args) => commands::create::handle(&ctx, args).await,
        Commands::Read => commands::read::handle(&ctx).await,
        Commands::Delete => commands::delete::handle(&ctx).await,
        Commands::Show => commands::show::handle(&ctx),
    }
}
