//! Runtime configuration, read from the environment.

/// Upstream LLM gateway settings for the operator functions.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Chat completions endpoint of the gateway
    pub url: String,
    /// Bearer token; requests are refused upstream without one
    pub api_key: Option<String>,
    /// Model forwarded with every request
    pub model: String,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("AI_GATEWAY_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            api_key: std::env::var("AI_GATEWAY_API_KEY").ok(),
            model: std::env::var("OPERATOR_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Operator functions server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3001);
        Self { port }
    }
}
