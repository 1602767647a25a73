//! Chat completion provider trait and the OpenAI-compatible implementation

pub mod openai;

use async_trait::async_trait;

use crate::types::ChatRequest;

/// Chat completion failures, before they are mapped to a function's messages
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Provider answered 429
    #[error("rate limited by provider")]
    RateLimited,

    /// Provider answered 402
    #[error("provider credits exhausted")]
    PaymentRequired,

    /// Provider answered with another non-success status
    #[error("provider returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Request never reached the provider
    #[error("connection error: {0}")]
    Connection(String),

    /// Response was not a chat completion
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// The first choice carried no text
    #[error("empty completion")]
    EmptyContent,

    /// No gateway key is configured
    #[error("AI gateway API key is not configured")]
    NotConfigured,
}

/// Trait implemented by each chat completion backend
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Run a non-streaming completion and return the reply text
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError>;
}
