//! Transient conversation state for an operator chat session.
//!
//! Owned by the view that opened the stream and discarded with it; nothing
//! here persists. One request may be in flight at a time: `begin_request`
//! refuses while a previous send is pending, which is the only guard the
//! UI needs to keep streams from racing each other.

use crate::domain::models::{ChatMessage, ChatRole};
use crate::shared::errors::OperatorError;

/// Message list plus the in-progress assistant slot.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<ChatMessage>,
    streaming: Option<ChatMessage>,
    error: Option<String>,
    in_flight: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed transcript (does not include the streaming slot).
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The assistant reply currently being streamed, if any.
    pub fn streaming(&self) -> Option<&ChatMessage> {
        self.streaming.as_ref()
    }

    /// Fixed user-facing error shown in place of the discarded reply.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start a send: push the user message, open an empty assistant slot and
    /// return the payload messages for the request. Returns `None` while a
    /// previous request is still in flight (sending is disabled).
    pub fn begin_request(&mut self, user_text: impl Into<String>) -> Option<Vec<ChatMessage>> {
        if self.in_flight {
            return None;
        }
        self.error = None;
        self.messages.push(ChatMessage::user(user_text));
        self.streaming = Some(ChatMessage::assistant(String::new()));
        self.in_flight = true;
        Some(self.messages.clone())
    }

    /// Apply a cumulative content snapshot to the streaming slot. The
    /// snapshot replaces the slot's content outright.
    pub fn apply_update(&mut self, cumulative: &str) {
        if let Some(slot) = self.streaming.as_mut() {
            slot.content.clear();
            slot.content.push_str(cumulative);
        }
    }

    /// Stream finished cleanly: the assistant reply joins the transcript.
    pub fn complete(&mut self) {
        if let Some(reply) = self.streaming.take() {
            debug_assert_eq!(reply.role, ChatRole::Assistant);
            self.messages.push(reply);
        }
        self.in_flight = false;
    }

    /// Stream failed: the partial reply is discarded from the history and
    /// the error's fixed message shows in its place.
    pub fn fail(&mut self, error: &OperatorError) {
        self.streaming = None;
        self.error = Some(error.user_message().to_string());
        self.in_flight = false;
    }
}
