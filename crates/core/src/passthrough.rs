// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pass-through replay
//!
//! Delivers staged content to a classified [`Sink`] once the transaction
//! commits. Sinks may accept only a prefix of what they are offered; the
//! unconsumed suffix is offered again until nothing is left.

use crate::sink::Sink;
use std::io::{self, Read, Seek, SeekFrom};

/// Offer `data` to `sink` until it has all been consumed.
///
/// The sink is always called at least once, even for empty data, so a file
/// sink opened for writing is still created.
pub fn replay(sink: &mut Sink<'_>, data: &[u8]) -> io::Result<()> {
    let mut rest = data;
    loop {
        match sink.write_some(rest)? {
            None => break,
            Some(0) if !rest.is_empty() => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("{} accepted no bytes", sink.describe()),
                ))
            }
            Some(n) => rest = &rest[n.min(rest.len())..],
        }
        if rest.is_empty() {
            break;
        }
    }
    Ok(())
}

/// Replay a disk stage in `chunk_size` blocks without loading it whole.
///
/// The scratch buffer never outgrows the staged content, so an oversized
/// `chunk_size` costs no more memory than the stage itself. Returns the
/// number of bytes delivered.
pub fn replay_chunked<R: Read + Seek>(
    sink: &mut Sink<'_>,
    source: &mut R,
    chunk_size: usize,
) -> io::Result<u64> {
    let len = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(0))?;

    let capacity = usize::try_from(len).map_or(chunk_size, |len| len.min(chunk_size));
    let mut buf = vec![0u8; capacity.max(1)];
    let mut total = 0u64;
    loop {
        let read = source.read(&mut buf)?;
        if read == 0 {
            break;
        }
        replay(sink, &buf[..read])?;
        total += read as u64;
    }

    tracing::debug!(
        sink = %sink.describe(),
        bytes = total,
        chunk_size,
        "replayed staging file"
    );
    Ok(total)
}

#[cfg(test)]
#[path = "passthrough_tests.rs"]
mod tests;
