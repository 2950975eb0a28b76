// Domain models (wire shapes shared by client and server)
// Pure Rust, no framework dependencies

pub mod chunk;
pub mod message;

pub use chunk::{ChatCompletionChunk, StreamChoice, StreamDelta, DONE_FRAME};
pub use message::{ChatMessage, ChatRole, OperatorChatRequest, OperatorContext};
