//! Incremental decoder for `text/event-stream` bodies.
//!
//! Only `data` fields matter to the status stream; `event`, `id`, `retry` and
//! comment lines are skipped.

use cvfactory_logging::client_warn;

/// Longest line kept while waiting for its newline.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
    max_line: usize,
    /// Dropping the rest of an oversized line up to its newline.
    discarding: bool,
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
            pending: Vec::new(),
            data: Vec::new(),
            max_line,
            discarding: false,
        }
    }

    /// Feeds one body chunk and returns the `data` payloads of every event
    /// completed by it. Chunks may split lines (or UTF-8 sequences) anywhere.
    ///
    /// A line longer than the limit is dropped together with the event it
    /// belongs to.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut chunk = chunk;
        if self.discarding {
            match chunk.iter().position(|byte| *byte == b'\n') {
                Some(newline) => {
                    self.discarding = false;
                    chunk = &chunk[newline + 1..];
                }
                None => return Vec::new(),
            }
        }
        self.pending.extend_from_slice(chunk);

        let mut messages = Vec::new();
        while let Some(newline) = self.pending.iter().position(|byte| *byte == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(message) = self.process_line(&String::from_utf8_lossy(&line)) {
                messages.push(message);
            }
        }

        if self.pending.len() > self.max_line {
            client_warn!(
                "Dropping event stream line longer than {} bytes",
                self.max_line
            );
            self.pending.clear();
            self.data.clear();
            self.discarding = true;
        }
        messages
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            return Some(std::mem::take(&mut self.data).join("\n"));
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }
}
