// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::sink::{FakeSocket, RecordingCallback};
use std::io::Cursor;

#[test]
fn partial_writes_retry_with_shrinking_suffix() {
    let callback = RecordingCallback::new().accepting(2);
    let mut sink = Sink::Callable(Box::new(callback.clone()));

    replay(&mut sink, b"onetwo!").unwrap();

    assert_eq!(callback.payloads(), vec!["onetwo!", "etwo!", "wo!", "!"]);
}

#[test]
fn none_means_everything_was_consumed() {
    let callback = RecordingCallback::new();
    let mut sink = Sink::Callable(Box::new(callback.clone()));

    replay(&mut sink, b"onetwo").unwrap();

    assert_eq!(callback.payloads(), vec!["onetwo"]);
}

#[test]
fn empty_payload_still_calls_the_sink_once() {
    let callback = RecordingCallback::new().accepting(4);
    let mut sink = Sink::Callable(Box::new(callback.clone()));

    replay(&mut sink, b"").unwrap();

    assert_eq!(callback.payloads(), vec![""]);
}

#[test]
fn zero_progress_is_an_error() {
    let mut sink = Sink::Callable(Box::new(|_: &[u8]| -> io::Result<Option<usize>> {
        Ok(Some(0))
    }));

    let err = replay(&mut sink, b"stuck").unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::WriteZero);
}

#[test]
fn overreported_count_is_clamped() {
    let mut calls = 0;
    let mut sink = Sink::Callable(Box::new(|_: &[u8]| -> io::Result<Option<usize>> {
        calls += 1;
        Ok(Some(100))
    }));

    replay(&mut sink, b"abc").unwrap();
    drop(sink);

    assert_eq!(calls, 1);
}

#[test]
fn socket_receives_a_single_send() {
    let socket = FakeSocket::new();
    let mut sink = Sink::Socket(Box::new(socket.clone()));

    replay(&mut sink, b"onetwo").unwrap();

    assert_eq!(socket.sent(), vec![b"onetwo".to_vec()]);
}

#[test]
fn chunked_replay_splits_into_blocks() {
    let callback = RecordingCallback::new();
    let mut sink = Sink::Callable(Box::new(callback.clone()));
    let mut source = Cursor::new(b"abcdefgh".to_vec());
    source.set_position(8);

    let total = replay_chunked(&mut sink, &mut source, 3).unwrap();

    assert_eq!(total, 8);
    assert_eq!(callback.payloads(), vec!["abc", "def", "gh"]);
}

#[test]
fn oversized_chunk_size_is_bounded_by_the_stage() {
    let callback = RecordingCallback::new();
    let mut sink = Sink::Callable(Box::new(callback.clone()));
    let mut source = Cursor::new(b"abc".to_vec());

    let total = replay_chunked(&mut sink, &mut source, usize::MAX / 2).unwrap();

    assert_eq!(total, 3);
    assert_eq!(callback.payloads(), vec!["abc"]);
}

#[test]
fn chunked_replay_of_empty_stage_does_nothing() {
    let callback = RecordingCallback::new();
    let mut sink = Sink::Callable(Box::new(callback.clone()));

    let total = replay_chunked(&mut sink, &mut Cursor::new(Vec::new()), 16).unwrap();

    assert_eq!(total, 0);
    assert!(callback.calls().is_empty());
}

// =============================================================================
// Property tests
// =============================================================================

use proptest::prelude::*;

proptest! {
    #[test]
    fn replay_delivers_every_byte_in_order(
        payload in proptest::collection::vec(any::<u8>(), 0..512),
        counts in proptest::collection::vec(1usize..17, 1..8),
    ) {
        let mut received = Vec::new();
        let mut call = 0usize;
        {
            let mut sink = Sink::Callable(Box::new(|data: &[u8]| -> io::Result<Option<usize>> {
                let n = counts[call % counts.len()].min(data.len());
                call += 1;
                received.extend_from_slice(&data[..n]);
                Ok(Some(n))
            }));
            replay(&mut sink, &payload).unwrap();
        }

        prop_assert_eq!(received, payload);
    }

    #[test]
    fn chunked_replay_matches_whole_replay(
        payload in proptest::collection::vec(any::<u8>(), 0..512),
        chunk_size in 1usize..64,
        accept in 1usize..9,
    ) {
        let callback = RecordingCallback::new().accepting(accept);
        let mut sink = Sink::Callable(Box::new(callback.clone()));

        replay_chunked(&mut sink, &mut Cursor::new(payload.clone()), chunk_size).unwrap();

        let delivered: Vec<u8> = callback
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                crate::sink::CallbackCall::Call(data) => {
                    Some(data[..data.len().min(accept)].to_vec())
                }
                crate::sink::CallbackCall::Close { .. } => None,
            })
            .flatten()
            .collect();
        prop_assert_eq!(delivered, payload);
    }
}
