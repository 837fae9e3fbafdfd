//! Line tokenizer and event parser for `data:`-prefixed streaming responses.
//!
//! The body arrives as arbitrary byte chunks. [`LineBuffer`] holds any trailing
//! partial line until the next chunk completes it, so records split across
//! chunk boundaries are parsed whole.

use bytes::{Bytes, BytesMut};
use serde::Deserialize;

const DATA_PREFIX: &str = "data:";

#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: BytesMut,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    /// Pops the next complete line without its `\n` (or `\r\n`) terminator.
    pub fn next_line(&mut self) -> Option<Bytes> {
        let newline = self.pending.iter().position(|b| *b == b'\n')?;
        let mut line = self.pending.split_to(newline + 1);
        line.truncate(newline);
        Some(strip_carriage_return(line))
    }

    /// Drains whatever is left once the body has ended.
    pub fn finish(&mut self) -> Option<Bytes> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = self.pending.split();
        Some(strip_carriage_return(rest))
    }
}

fn strip_carriage_return(mut line: BytesMut) -> Bytes {
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    line.freeze()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Context,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank or not an event line.
    Ignored,
    Event(StreamRecord),
    /// A `data:` line whose payload did not parse; holds the parser message.
    Malformed(String),
}

pub fn parse_event_line(line: &str) -> LineOutcome {
    if line.trim().is_empty() {
        return LineOutcome::Ignored;
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return LineOutcome::Ignored;
    };
    match serde_json::from_str::<StreamRecord>(payload.trim()) {
        Ok(record) => LineOutcome::Event(record),
        Err(err) => LineOutcome::Malformed(err.to_string()),
    }
}
