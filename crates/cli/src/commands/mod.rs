// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod dump;
pub mod write;

use safer_core::{DryRun, Options, TempFile};
use std::path::PathBuf;

/// Staging flags shared by every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct StagingArgs {
    /// Stage in a file next to the target instead of memory (optionally at PATH)
    #[arg(long, num_args = 0..=1, require_equals = true, value_name = "PATH")]
    pub temp_file: Option<Option<PathBuf>>,

    /// Keep the staging file when the write fails
    #[arg(long)]
    pub keep_failures: bool,

    /// Create missing parent directories of the target
    #[arg(long)]
    pub make_parents: bool,

    /// Report what would be written without touching the target
    #[arg(long)]
    pub dry_run: bool,
}

impl StagingArgs {
    /// Overlay the flags that were given onto `options`
    pub fn apply<'a>(&self, mut options: Options<'a>, staged: &'a mut usize) -> Options<'a> {
        match &self.temp_file {
            Some(Some(path)) => options.temp_file = TempFile::Named(path.clone()),
            Some(None) => options.temp_file = TempFile::Auto,
            None => {}
        }
        if self.keep_failures {
            options.delete_failures = false;
        }
        if self.make_parents {
            options.make_parents = true;
        }
        if self.dry_run {
            options.dry_run = DryRun::callback(move |data| *staged += data.len());
        }
        options
    }
}

/// Tell the user what a dry run would have written
pub fn report_dry_run(args: &StagingArgs, staged: usize, target: &str) {
    if args.dry_run {
        println!("dry run: would write {staged} bytes to {target}");
    }
}
