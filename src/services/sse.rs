//! Server-Sent Events framing
//!
//! Incremental decoder for `text/event-stream` bodies. Chunks may split
//! lines (and UTF-8 sequences) anywhere; complete events are returned as
//! soon as their terminating blank line arrives.

/// One dispatched event
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// `event:` field, if present
    pub event: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
    /// `id:` field, if present
    pub id: Option<String>,
}

/// Longest line kept while waiting for its newline
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Incremental event-stream decoder
#[derive(Debug)]
pub struct SseDecoder {
    buf: Vec<u8>,
    data: Vec<String>,
    event: Option<String>,
    id: Option<String>,
    max_line: usize,
    /// Dropping the rest of an overlong line
    skipping: bool,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_line_limit(MAX_LINE_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line_limit(max_line: usize) -> Self {
        Self {
            buf: Vec::new(),
            data: Vec::new(),
            event: None,
            id: None,
            max_line,
            skipping: false,
        }
    }

    /// Feed a chunk of the body, returning every event it completes
    ///
    /// A line longer than the limit is discarded together with the event it
    /// belongs to.
    pub fn feed(&mut self, mut chunk: &[u8]) -> Vec<SseEvent> {
        if self.skipping {
            match chunk.iter().position(|b| *b == b'\n') {
                Some(pos) => {
                    chunk = &chunk[pos + 1..];
                    self.skipping = false;
                }
                None => return Vec::new(),
            }
        }
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        if self.buf.len() > self.max_line {
            tracing::warn!(
                "Discarding SSE line longer than {} bytes",
                self.max_line
            );
            self.buf.clear();
            self.data.clear();
            self.event = None;
            self.skipping = true;
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            "retry" => {}
            other => tracing::trace!("Ignoring unknown SSE field: {}", other),
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }

        Some(SseEvent {
            event,
            data: std::mem::take(&mut self.data).join("\n"),
            id: self.id.clone(),
        })
    }
}
