use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::base::StreamEvent;
use crate::tool_xml::ToolSchema;

const DATA_PREFIX: &str = "data: ";

/// How message content is handed to the caller
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamMode {
    /// Emit every content chunk as soon as it is decoded
    #[default]
    Incremental,
    /// Hold content until the stream ends, then emit the narrative text followed by
    /// the normalized tool calls, so a tag split across chunks never leaks out raw
    ToolAware,
}

/// Incremental decoder for the `data: {json}` lines of a Dust message event stream.
///
/// Feed body chunks as they arrive with [`feed`](Self::feed) and call
/// [`finish`](Self::finish) once the body ends. Malformed lines are logged and skipped.
#[derive(Debug)]
pub struct DustStreamDecoder {
    mode: StreamMode,
    pending: Vec<u8>,
    content: String,
}

impl DustStreamDecoder {
    pub fn new(mode: StreamMode) -> Self {
        Self {
            mode,
            pending: Vec::new(),
            content: String::new(),
        }
    }

    /// Feed raw body bytes and drain the events of every complete line.
    ///
    /// A trailing partial line is kept until the next chunk completes it.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.pending.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            self.decode_line(&line[..newline], &mut events);
        }

        events
    }

    /// Flush the last unterminated line and, in tool-aware mode, the held content
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.decode_line(&line, &mut events);
        }

        if self.mode == StreamMode::ToolAware && !self.content.is_empty() {
            let content = std::mem::take(&mut self.content);
            let text = ToolSchema::builtin().parse(&content).to_text();
            if !text.is_empty() {
                events.push(StreamEvent::text(text));
            }
        }

        events
    }

    /// Decode a complete stream in one shot
    pub fn decode_all(mode: StreamMode, input: &[u8]) -> Vec<StreamEvent> {
        let mut decoder = Self::new(mode);
        let mut events = decoder.feed(input);
        events.extend(decoder.finish());
        events
    }

    fn decode_line(&mut self, raw: &[u8], events: &mut Vec<StreamEvent>) {
        let line = String::from_utf8_lossy(raw);
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.trim().is_empty() {
            return;
        }

        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return;
        };

        match serde_json::from_str::<Value>(payload) {
            Ok(value) => {
                if let Some(event) = self.map_event(&value) {
                    events.push(event);
                }
            }
            Err(e) => {
                tracing::warn!("Skipping malformed stream event: {}", e);
            }
        }
    }

    fn map_event(&mut self, value: &Value) -> Option<StreamEvent> {
        let data = value.get("data");

        match value.get("type")?.as_str()? {
            "message" => {
                let content = data?
                    .get("content")?
                    .as_str()
                    .filter(|content| !content.is_empty())?;
                match self.mode {
                    StreamMode::Incremental => Some(StreamEvent::text(content)),
                    StreamMode::ToolAware => {
                        self.content.push_str(content);
                        None
                    }
                }
            }
            "usage" => {
                let tokens = |key: &str| {
                    data.and_then(|data| data.get(key))
                        .and_then(Value::as_u64)
                        .unwrap_or(0)
                };
                Some(StreamEvent::usage(
                    tokens("prompt_tokens"),
                    tokens("completion_tokens"),
                ))
            }
            _ => None,
        }
    }
}
