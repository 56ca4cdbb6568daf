// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! safer - all-or-nothing writes from the command line

mod commands;
mod error;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{dump, write};
use safer_core::Settings;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::error::CliError;

#[derive(Parser)]
#[command(
    name = "safer",
    version,
    about = "Write files all-or-nothing: the target changes only if everything succeeds"
)]
struct Cli {
    /// Settings file (TOML) with default options
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy stdin into a file, replacing it only if the copy completes
    Write(write::WriteArgs),
    /// Convert a JSON, TOML or YAML document and write it transactionally
    Dump(dump::DumpArgs),
}

fn main() -> ExitCode {
    setup_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", CliError::from_anyhow(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    match cli.command {
        Commands::Write(args) => write::write(args, &settings),
        Commands::Dump(args) => dump::dump(args, &settings),
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .init();
}
