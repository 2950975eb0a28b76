//! Incremental decoder for OpenAI-style SSE chat completion streams.
//!
//! Consumes raw response-body bytes as they arrive and turns them into a
//! growing assistant reply. Frames and multi-byte characters may straddle
//! read boundaries; the decoder carries the unresolved tail between reads.

use serde_json::Value;

use crate::domain::models::ChatCompletionChunk;
use crate::shared::logging;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Update produced while decoding a read.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    /// Full assistant text accumulated so far. Consumers replace their
    /// displayed content with this snapshot, they never append.
    Content(String),
    /// The `[DONE]` sentinel was seen; no further updates follow.
    Done,
}

/// Stateful SSE decoder for a single chat response body.
///
/// One decoder per request; feed it each chunk of bytes as it arrives and
/// apply the returned updates in order. Once `[DONE]` has been seen every
/// further `feed` is a no-op, even if unread bytes remain buffered.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Undecoded trailing bytes (incomplete UTF-8 sequence from the last read)
    pending_bytes: Vec<u8>,
    /// Decoded text not yet resolved into complete lines
    pending_text: String,
    /// Accumulated assistant reply
    content: String,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Assistant text accumulated so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Feed the next chunk of bytes from the response body.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamUpdate> {
        if self.done {
            return Vec::new();
        }
        self.decode_bytes(chunk);
        self.drain_lines()
    }

    /// Signal end of the underlying stream and return the final text.
    /// An unresolved partial line is dropped, never processed.
    pub fn finish(&mut self) -> String {
        self.done = true;
        self.pending_bytes.clear();
        self.pending_text.clear();
        self.content.clone()
    }

    /// Stateful UTF-8 decode: an incomplete trailing sequence is held back
    /// for the next read, invalid sequences decode to U+FFFD.
    fn decode_bytes(&mut self, chunk: &[u8]) {
        self.pending_bytes.extend_from_slice(chunk);
        let buf = std::mem::take(&mut self.pending_bytes);
        let mut input = buf.as_slice();
        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    self.pending_text.push_str(valid);
                    input = &[];
                    break;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        self.pending_text.push_str(text);
                    }
                    match err.error_len() {
                        // Incomplete sequence at the end of the read
                        None => {
                            input = rest;
                            break;
                        }
                        Some(invalid) => {
                            self.pending_text.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[invalid..];
                        }
                    }
                }
            }
        }
        self.pending_bytes = input.to_vec();
    }

    fn drain_lines(&mut self) -> Vec<StreamUpdate> {
        let mut updates = Vec::new();

        while let Some(pos) = self.pending_text.find('\n') {
            let mut line: String = self.pending_text.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(':') {
                continue;
            }
            // The prefix must start the line itself; only the payload is trimmed
            let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                // Not a data record; dropped, never re-buffered
                continue;
            };
            let payload = payload.trim();

            if payload == DONE_SENTINEL {
                self.done = true;
                updates.push(StreamUpdate::Done);
                break;
            }

            match serde_json::from_str::<Value>(payload) {
                Ok(value) => {
                    // Valid JSON with an unexpected shape degrades to "no
                    // content" and the line is consumed.
                    let chunk: ChatCompletionChunk =
                        serde_json::from_value(value).unwrap_or_default();
                    if let Some(delta) = chunk.delta_content()
                        && !delta.is_empty()
                    {
                        self.content.push_str(&delta);
                        updates.push(StreamUpdate::Content(self.content.clone()));
                    }
                }
                Err(_) => {
                    // The JSON may have been cut by a chunk boundary: put the
                    // whole line back in front of the pending text and wait
                    // for more bytes before retrying.
                    logging::log_frame_rebuffered(line.len());
                    self.pending_text.insert(0, '\n');
                    self.pending_text.insert_str(0, &line);
                    break;
                }
            }
        }

        updates
    }
}
