//! Incremental decoder for server-sent event streams.
//!
//! The service frames events as SSE: frames separated by a blank line, each
//! carrying one JSON payload across its `data:` lines. The decoder accepts
//! raw network chunks, which may split frames at arbitrary byte positions,
//! and yields complete payloads as they become available.

use std::collections::VecDeque;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};

use crate::client::EventStream;
use crate::error::Error;
use crate::protocol::InteractionEvent;

/// Raw bytes as read off one HTTP response body.
pub(crate) type ByteStream = BoxStream<'static, reqwest::Result<Bytes>>;

/// Sentinel some SSE endpoints send to mark the end of data.
const DONE_SENTINEL: &str = "[DONE]";

/// Streaming SSE decoder.
///
/// Feed it chunks with [`SseDecoder::push_chunk`]; it buffers partial frames
/// internally and returns the `data` payload of every frame completed by the
/// chunk.
#[derive(Default)]
pub(crate) struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some((end, delim_len)) = find_frame_boundary(&self.buf) {
            let frame: Vec<u8> = self.buf.drain(..end + delim_len).take(end).collect();
            if let Some(payload) = frame_data(&frame) {
                payloads.push(payload);
            }
        }
        payloads
    }
}

/// Locate the next frame boundary: a blank line, in either LF or CRLF form.
fn find_frame_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len()
            && buf[i] == b'\r'
            && buf[i + 1] == b'\n'
            && buf[i + 2] == b'\r'
            && buf[i + 3] == b'\n'
        {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

/// Collect the `data:` lines of one frame into a payload.
///
/// Comment lines (leading `:`) and field lines other than `data` are
/// skipped. Frames without data, such as keep-alive comments, yield `None`.
fn frame_data(frame: &[u8]) -> Option<String> {
    if frame.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(frame);
    let mut data_lines: Vec<&str> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if data_lines.is_empty() {
        return None;
    }
    Some(data_lines.join("\n"))
}

/// Turn a response body into a stream of parsed interaction events.
///
/// The stream ends when the body ends. A read failure on the body surfaces
/// as a transport fault; a payload that is not valid event JSON surfaces as
/// a protocol error. Both end the stream.
pub(crate) fn event_stream(bytes: ByteStream) -> EventStream {
    struct State {
        bytes: ByteStream,
        decoder: SseDecoder,
        pending: VecDeque<InteractionEvent>,
        done: bool,
    }

    let stream = stream::try_unfold(
        State {
            bytes,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Ok(Some((event, state)));
                }
                if state.done {
                    return Ok(None);
                }

                match state.bytes.next().await {
                    Some(Ok(chunk)) => {
                        for payload in state.decoder.push_chunk(&chunk) {
                            if payload == DONE_SENTINEL {
                                state.done = true;
                                break;
                            }
                            tracing::trace!(len = payload.len(), "received event payload");
                            let event = serde_json::from_str::<InteractionEvent>(&payload)
                                .map_err(|e| Error::event_parse(e, &payload))?;
                            state.pending.push_back(event);
                        }
                    }
                    Some(Err(e)) => {
                        // Mid-body failures are connection-level, whatever
                        // reqwest wrapped them in.
                        return Err(Error::transport(format!("event stream read failed: {e}")));
                    }
                    None => {
                        state.done = true;
                    }
                }
            }
        },
    );

    stream.boxed()
}
