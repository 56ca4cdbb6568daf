// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional writers over arbitrary targets

use crate::closer::{Closer, Strategy};
use crate::config::{DryRun, Options};
use crate::error::{ConfigError, Result};
use crate::handle::Handle;
use crate::layers::{self, LayerSpec};
use crate::open::{check_encoding, open};
use crate::sink::{classify, Target};
use crate::staging::allocate;

/// Wrap `target` so that everything written reaches it only on a clean close.
///
/// Path targets are opened with [`open`] in `"w"` (or `"wb"`) mode. Streams,
/// sockets and callables get a staged handle that replays the whole payload
/// into the target at commit time.
pub fn writer<'a>(target: impl Into<Target<'a>>, options: Options<'a>) -> Result<Handle<'a>> {
    let target = match target.into() {
        Target::Path(path) => {
            let mode = if options.is_binary == Some(true) { "wb" } else { "w" };
            return open(path, mode, options);
        }
        other => other,
    };

    if options.chunk_size == 0 {
        return Err(ConfigError::ZeroChunkSize.into());
    }

    // A disabled writer writes straight through, dry run included
    let dry_run = if options.enabled {
        options.dry_run
    } else {
        DryRun::Off
    };

    let kind = target.kind();
    let classified = classify(target, options.is_binary, options.close_on_exit, dry_run)?;
    let spec =
        LayerSpec::new(classified.is_binary, options.buffering).with_newline(options.newline);
    check_encoding(classified.is_binary, options.encoding.as_deref())?;
    spec.validate()?;

    if !options.enabled {
        return Ok(Handle::direct(classified.sink, classified.close_on_exit));
    }

    let alloc = allocate(&options.temp_file, None, options.delete_failures)?;
    let strategy = match alloc.stage {
        Some(stage) => Strategy::FileReplay {
            sink: classified.sink,
            stage,
            chunk_size: options.chunk_size,
        },
        None => Strategy::MemoryReplay {
            sink: classified.sink,
        },
    };

    tracing::debug!(kind, binary = classified.is_binary, "opened transactional writer");
    let stream = layers::build(alloc.raw, &spec)?;
    Ok(Handle::staged(Closer::new(stream, strategy, classified.close_on_exit)))
}

/// Like [`writer`], but the target is also closed once the handle is
pub fn closer<'a>(target: impl Into<Target<'a>>, options: Options<'a>) -> Result<Handle<'a>> {
    writer(target, options.with_close_on_exit(true))
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
