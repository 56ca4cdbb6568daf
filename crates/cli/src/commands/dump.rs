// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `safer dump <input> <output>` - Convert a document and write it transactionally

use super::{report_dry_run, StagingArgs};
use anyhow::{Context, Result};
use clap::Args;
use safer_core::{Format, Options, Settings, Target};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct DumpArgs {
    /// Input document; its extension picks the parser
    pub input: PathBuf,

    /// Output file, or `-` for stdout
    pub output: String,

    /// Output format (json, toml, yaml); defaults to the output extension
    #[arg(long, short)]
    pub format: Option<Format>,

    #[command(flatten)]
    pub staging: StagingArgs,
}

/// Parse `path` into a format-neutral value
fn load(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = match Format::from_path(path)? {
        Format::Json => serde_json::from_str(&text)?,
        Format::Toml => toml::from_str(&text)?,
        Format::Yaml => serde_yaml::from_str(&text)?,
    };
    Ok(value)
}

pub fn dump(args: DumpArgs, settings: &Settings) -> Result<()> {
    let value =
        load(&args.input).with_context(|| format!("invalid input {}", args.input.display()))?;

    let mut staged = 0usize;
    {
        let options = args.staging.apply(settings.apply(Options::new()), &mut staged);
        let target = match args.output.as_str() {
            "-" => Target::Stdout,
            path => Target::from(path),
        };
        safer_core::dump(&value, target, args.format, options)?;
    }

    report_dry_run(&args.staging, staged, &args.output);
    Ok(())
}
