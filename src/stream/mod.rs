//! Incremental decoding of SSE chat completion streams.

pub mod decoder;

pub use decoder::{SseDecoder, StreamUpdate};
