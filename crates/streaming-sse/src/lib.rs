//! # Server-Sent Events decoding
//!
//! Every vendor in this crate streams over SSE. This module provides:
//! - `SseEvent`: one dispatched SSE event
//! - `SseDecoder`: incremental, chunk-boundary-safe decoder
//! - `SseChunkParser`: per-dialect mapping from SSE events to `StreamEvent`s
//! - `sse_event_stream`: the byte-stream to event-stream pipeline

use std::collections::VecDeque;

use bytes::Bytes;

use crate::ai_sdk_core::error::SdkError;
use crate::ai_sdk_types::StreamEvent;

pub mod pipeline;
pub use pipeline::sse_event_stream;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// `event:` field, if the server named the event.
    pub event: Option<String>,
    pub data: Bytes,
    pub id: Option<String>,
    pub retry: Option<u64>,
}

impl SseEvent {
    pub fn data(data: impl Into<Bytes>) -> Self {
        Self {
            event: None,
            data: data.into(),
            id: None,
            retry: None,
        }
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn data_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

/// Incremental SSE decoder.
///
/// Lines may end in `\n`, `\r\n` or a bare `\r`; a blank line dispatches the
/// pending event. Partial lines are buffered across `push` calls.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    pending: PendingEvent,
    ready: VecDeque<SseEvent>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and drain every event it completes.
    pub fn push(&mut self, chunk: &[u8]) -> impl Iterator<Item = SseEvent> + '_ {
        self.buffer.extend_from_slice(chunk);
        while let Some((line_len, terminator_len)) = next_line(&self.buffer) {
            let line: Vec<u8> = self.buffer.drain(..line_len + terminator_len).collect();
            self.handle_line(&line[..line_len]);
        }
        self.ready.drain(..)
    }

    pub fn has_buffered_data(&self) -> bool {
        !self.buffer.is_empty() || self.pending.has_data()
    }

    /// Flush at end of stream.
    ///
    /// Servers that close right after the last `data:` line never send the
    /// terminating blank line; the pending event is dispatched anyway.
    pub fn finish(&mut self) -> impl Iterator<Item = SseEvent> + '_ {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let trimmed = rest.strip_suffix(b"\r").unwrap_or(&rest);
            self.handle_line(trimmed);
        }
        self.dispatch();
        self.ready.drain(..)
    }

    fn handle_line(&mut self, line: &[u8]) {
        if line.is_empty() {
            self.dispatch();
            return;
        }
        if line.starts_with(b":") {
            return;
        }
        let line = String::from_utf8_lossy(line);
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line.as_ref(), ""),
        };
        match field {
            "data" => self.pending.data.push(value.to_string()),
            "event" => self.pending.event = Some(value.to_string()),
            "id" => self.pending.id = Some(value.to_string()),
            "retry" => {
                if let Ok(ms) = value.parse::<u64>() {
                    self.pending.retry = Some(ms);
                }
            }
            _ => {}
        }
    }

    fn dispatch(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if let Some(event) = pending.build() {
            self.ready.push_back(event);
        }
    }
}

#[derive(Debug, Default)]
struct PendingEvent {
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
    retry: Option<u64>,
}

impl PendingEvent {
    fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// Events without any `data:` line are dropped.
    fn build(self) -> Option<SseEvent> {
        if self.data.is_empty() {
            return None;
        }
        Some(SseEvent {
            event: self.event,
            data: Bytes::from(self.data.join("\n")),
            id: self.id,
            retry: self.retry,
        })
    }
}

/// Length of the next complete line and of its terminator.
///
/// A trailing `\r` is left buffered until the next byte shows whether it
/// starts a `\r\n` pair.
fn next_line(buf: &[u8]) -> Option<(usize, usize)> {
    let pos = buf.iter().position(|b| *b == b'\n' || *b == b'\r')?;
    if buf[pos] == b'\n' {
        return Some((pos, 1));
    }
    match buf.get(pos + 1) {
        None => None,
        Some(b'\n') => Some((pos, 2)),
        Some(_) => Some((pos, 1)),
    }
}

/// Maps one dialect's SSE events onto `StreamEvent`s.
pub trait SseChunkParser: Send {
    /// `Ok(None)` skips the event (keep-alives, pings).
    fn parse(&mut self, event: &SseEvent) -> Result<Option<Vec<StreamEvent>>, SdkError>;

    /// True once the dialect's terminal frame has been seen.
    fn is_done(&self) -> bool {
        false
    }

    /// Called when the body ends; flushes buffered state.
    fn finish(&mut self) -> Result<Vec<StreamEvent>, SdkError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[path = "../tests/decoder_tests.rs"]
mod decoder_tests;
#[cfg(test)]
#[path = "../tests/pipeline_tests.rs"]
mod pipeline_tests;
