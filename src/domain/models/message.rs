use serde::{Deserialize, Serialize};

/// Role of a chat participant on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Single message in an operator conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Player context forwarded alongside the messages so the operator persona
/// can reference the sender's kit and recent games. Flattened into the
/// request body (`{ messages, ...context }`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorContext {
    /// One-line summary of the player's active loadout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loadout_summary: Option<String>,
    /// Number of game sessions the player has logged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games_logged: Option<u32>,
    /// Lifetime kill/death ratio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kd_ratio: Option<f64>,
}

impl OperatorContext {
    /// Render the context as briefing lines for the system prompt.
    /// Returns `None` when every field is empty.
    pub fn briefing(&self) -> Option<String> {
        let mut lines = Vec::new();
        if let Some(loadout) = &self.loadout_summary {
            lines.push(format!("Current loadout: {}", loadout));
        }
        if let Some(games) = self.games_logged {
            lines.push(format!("Games logged: {}", games));
        }
        if let Some(kd) = self.kd_ratio {
            lines.push(format!("K/D ratio: {:.2}", kd));
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

/// Body POSTed to an operator function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(flatten, default)]
    pub context: OperatorContext,
}

impl OperatorChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            context: OperatorContext::default(),
        }
    }

    pub fn with_context(mut self, context: OperatorContext) -> Self {
        self.context = context;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_flattens_into_request_body() {
        let request = OperatorChatRequest::new(vec![ChatMessage::user("hi")]).with_context(
            OperatorContext {
                loadout_summary: Some("M4 AEG, 1.2J".to_string()),
                games_logged: Some(12),
                kd_ratio: None,
            },
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["loadout_summary"], "M4 AEG, 1.2J");
        assert_eq!(json["games_logged"], 12);
        assert!(json.get("kd_ratio").is_none());
    }

    #[test]
    fn briefing_skips_empty_context() {
        assert!(OperatorContext::default().briefing().is_none());

        let ctx = OperatorContext {
            loadout_summary: None,
            games_logged: Some(3),
            kd_ratio: Some(1.5),
        };
        let briefing = ctx.briefing().unwrap();
        assert!(briefing.contains("Games logged: 3"));
        assert!(briefing.contains("K/D ratio: 1.50"));
    }
}
