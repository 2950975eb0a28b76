use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperatorError {
    /// Upstream returned HTTP 429 before streaming began
    #[error("rate limited by the AI gateway")]
    RateLimited,

    /// Upstream returned HTTP 402 before streaming began
    #[error("AI credits exhausted")]
    OutOfCredits,

    /// Any other non-2xx status before streaming began
    #[error("chat request failed with HTTP status {status}")]
    RequestFailed { status: u16 },

    /// Network failure while sending the request or reading the body
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller cancelled the in-flight stream
    #[error("request cancelled")]
    Cancelled,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OperatorError {
    /// Classify a pre-stream HTTP status. Returns `None` for success codes.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            429 => Some(Self::RateLimited),
            402 => Some(Self::OutOfCredits),
            status => Some(Self::RequestFailed { status }),
        }
    }

    /// Fixed user-facing message shown in place of the assistant reply.
    /// None of these paths retry automatically.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RateLimited => {
                "The operator is taking too much fire right now. Hold position and try again in a minute."
            }
            Self::OutOfCredits => {
                "Out of AI credits, operator. Top up your account to get back on comms."
            }
            Self::RequestFailed { .. } | Self::Serialization(_) => {
                "Failed to get a response from the operator. Please try again."
            }
            Self::Transport(_) => {
                "Lost comms mid-transmission. Resend your last message, operator."
            }
            Self::Cancelled => "Transmission cancelled.",
        }
    }
}

pub type Result<T> = std::result::Result<T, OperatorError>;
