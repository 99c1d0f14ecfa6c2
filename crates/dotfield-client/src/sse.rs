//! SSE (Server-Sent Events) wire framing.
//!
//! [`SseParser`] is an incremental push parser: feed it byte chunks as they
//! arrive and collect completed events. [`event_stream`] adapts a
//! `reqwest::Response` body into a `Stream<Item = SseEvent>` on top of it.

use std::collections::VecDeque;

use futures::Stream;
use tokio_stream::StreamExt;

/// A parsed SSE event.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
    pub id: Option<String>,
}

/// Incremental parser from byte chunks to [`SseEvent`]s.
///
/// Handles lines split across chunks, CRLF line endings, comment lines,
/// multi-line `data:` fields, and ignores `retry:` and unknown fields.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
    event_name: Option<String>,
    data_lines: Vec<String>,
    last_id: Option<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns every event completed by it, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut events = Vec::new();
        while let Some(newline_pos) = self.buffer.find('\n') {
            let line = self.buffer[..newline_pos]
                .trim_end_matches('\r')
                .to_string();
            self.buffer.drain(..=newline_pos);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush whatever the stream left unterminated.
    pub fn finish(&mut self) -> Option<SseEvent> {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            if let Some(event) = self.process_line(line.trim_end_matches('\r')) {
                return Some(event);
            }
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            // Blank line terminates the pending event.
            return self.dispatch();
        }
        if line.starts_with(':') {
            // Comment (keep-alive), skip.
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event_name = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            "id" => self.last_id = Some(value.to_string()),
            // "retry" and unknown fields carry nothing we act on.
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.data_lines.is_empty() {
            self.event_name = None;
            return None;
        }
        Some(SseEvent {
            event: self.event_name.take(),
            data: std::mem::take(&mut self.data_lines).join("\n"),
            id: self.last_id.clone(),
        })
    }
}

struct StreamState {
    byte_stream:
        std::pin::Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>,
    parser: SseParser,
    ready: VecDeque<SseEvent>,
    done: bool,
}

/// Parse a reqwest response body as an SSE stream.
///
/// The stream yields at most one `Err` (the transport failure that ended it)
/// and then terminates.
pub fn event_stream(response: reqwest::Response) -> impl Stream<Item = anyhow::Result<SseEvent>> {
    futures::stream::unfold(
        StreamState {
            byte_stream: Box::pin(response.bytes_stream()),
            parser: SseParser::new(),
            ready: VecDeque::new(),
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(event) = state.ready.pop_front() {
                    return Some((Ok(event), state));
                }
                if state.done {
                    return None;
                }

                match state.byte_stream.next().await {
                    Some(Ok(chunk)) => {
                        state.ready.extend(state.parser.feed(&chunk));
                    }
                    Some(Err(e)) => {
                        state.done = true;
                        return Some((Err(anyhow::anyhow!("SSE stream error: {e}")), state));
                    }
                    None => {
                        state.done = true;
                        if let Some(event) = state.parser.finish() {
                            state.ready.push_back(event);
                        }
                    }
                }
            }
        },
    )
}
