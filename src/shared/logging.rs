//! Structured logging module for the operator chat stack
//!
//! Provides consistent, contextual logging across the application.
//! Uses structured fields so stream lifecycles can be traced per request.

use crate::shared::errors::OperatorError;

/// Log operations for different stages of a chat request
#[derive(Debug, Clone, Copy)]
pub enum LogOperation {
    ChatStream,
    Decode,
    ProxyForward,
}

impl LogOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogOperation::ChatStream => "chat_stream",
            LogOperation::Decode => "decode",
            LogOperation::ProxyForward => "proxy_forward",
        }
    }
}

/// Log the start of a streaming chat request
pub fn log_stream_start(request_id: &str, message_count: usize) {
    tracing::info!(
        operation = LogOperation::ChatStream.as_str(),
        request_id = request_id,
        message_count = message_count,
        "Starting chat stream"
    );
}

/// Log clean completion of a stream
pub fn log_stream_complete(request_id: &str, content_chars: usize, updates: usize, elapsed_ms: i64) {
    tracing::info!(
        operation = LogOperation::ChatStream.as_str(),
        request_id = request_id,
        content_chars = content_chars,
        updates = updates,
        elapsed_ms = elapsed_ms,
        "Chat stream completed"
    );
}

/// Log a stream failure (pre-stream status or mid-stream transport)
pub fn log_stream_error(request_id: &str, error: &OperatorError) {
    tracing::error!(
        operation = LogOperation::ChatStream.as_str(),
        request_id = request_id,
        error = %error,
        "Chat stream failed"
    );
}

/// Log cooperative cancellation of an in-flight stream
pub fn log_stream_cancelled(request_id: &str) {
    tracing::info!(
        operation = LogOperation::ChatStream.as_str(),
        request_id = request_id,
        "Chat stream cancelled by caller"
    );
}

/// Log a frame that failed to parse and was re-buffered pending more bytes
pub fn log_frame_rebuffered(line_len: usize) {
    tracing::debug!(
        operation = LogOperation::Decode.as_str(),
        line_len = line_len,
        "Re-buffering undecodable frame, waiting for more bytes"
    );
}

/// Log a proxy forward to the upstream gateway
pub fn log_proxy_forward(function: &str, request_id: &str, model: &str) {
    tracing::info!(
        operation = LogOperation::ProxyForward.as_str(),
        function = function,
        request_id = request_id,
        model = model,
        "Forwarding chat request to AI gateway"
    );
}

/// Log an upstream gateway failure
pub fn log_proxy_upstream_error(function: &str, request_id: &str, status: u16) {
    tracing::error!(
        operation = LogOperation::ProxyForward.as_str(),
        function = function,
        request_id = request_id,
        upstream_status = status,
        "AI gateway returned an error status"
    );
}
