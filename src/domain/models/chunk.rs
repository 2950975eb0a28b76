//! OpenAI-style chat completion chunk frames carried by the SSE stream.

use serde::{Deserialize, Serialize};

/// Terminal record closing a completion stream.
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// One streamed chunk of a chat completion.
///
/// All fields default so that shape drift upstream degrades to "no content"
/// instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

/// Choice entry carrying an incremental delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub delta: StreamDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Delta object containing the incremental content fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// Build a chunk carrying a single content fragment.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            choices: vec![StreamChoice {
                index: 0,
                delta: StreamDelta {
                    role: None,
                    content: Some(content.into()),
                },
                finish_reason: None,
            }],
        }
    }

    /// The content fragment of the first choice, if any.
    pub fn delta_content(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.delta.content)
    }

    /// Serialize as a `data: <json>` SSE record with blank-line terminator.
    pub fn to_sse_frame(&self) -> Result<String, serde_json::Error> {
        Ok(format!("data: {}\n\n", serde_json::to_string(self)?))
    }
}
