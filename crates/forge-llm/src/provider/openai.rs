//! OpenAI-compatible chat gateway

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{ChatError, ChatProvider};
use crate::types::{ChatRequest, ChatResponse};

/// OpenAI-compatible provider
pub struct OpenAiProvider {
    client: Client,
    base_url: Url,
    api_key: SecretString,
}

impl OpenAiProvider {
    pub fn new(base_url: Url, api_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    /// Build the chat completions URL
    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        tracing::debug!(model = %request.model, messages = request.messages.len(), "sending chat completion");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "chat completion request failed");
                ChatError::Connection(e.to_string())
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "chat gateway returned error");

            return Err(match status.as_u16() {
                429 => ChatError::RateLimited,
                402 => ChatError::PaymentRequired,
                status => ChatError::Upstream { status, body },
            });
        }

        let wire_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        let content = wire_response.into_content().ok_or(ChatError::EmptyContent)?;

        tracing::debug!(content = %content, "raw chat completion");

        Ok(content)
    }
}
