// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `safer write <target>` - Copy stdin into a file transactionally

use super::{report_dry_run, StagingArgs};
use anyhow::Result;
use clap::Args;
use safer_core::{Options, SaferError, Settings};
use std::io;
use std::path::PathBuf;

#[derive(Args)]
pub struct WriteArgs {
    /// File to write
    pub target: PathBuf,

    /// Append to the existing content instead of replacing it
    #[arg(long)]
    pub append: bool,

    /// Copy bytes verbatim instead of requiring UTF-8 text
    #[arg(long)]
    pub binary: bool,

    #[command(flatten)]
    pub staging: StagingArgs,
}

impl WriteArgs {
    fn mode(&self) -> &'static str {
        match (self.append, self.binary) {
            (false, false) => "w",
            (false, true) => "wb",
            (true, false) => "a",
            (true, true) => "ab",
        }
    }
}

pub fn write(args: WriteArgs, settings: &Settings) -> Result<()> {
    let mut staged = 0usize;
    {
        let options = args.staging.apply(settings.apply(Options::new()), &mut staged);
        let mut handle = safer_core::open(&args.target, args.mode(), options)?;
        let mut stdin = io::stdin().lock();

        handle.within(|h| -> Result<(), SaferError> {
            io::copy(&mut stdin, h)?;
            Ok(())
        })?;
    }

    report_dry_run(&args.staging, staged, &args.target.display().to_string());
    Ok(())
}
