use std::sync::Arc;

use forge_config::LlmConfig;

use crate::{
    provider::{ChatError, ChatProvider, openai::OpenAiProvider},
    types::{ChatRequest, Message},
};

/// The configured chat model behind every generator
///
/// Without an API key the gateway still exists and every completion fails
/// with [`ChatError::NotConfigured`], so request validation keeps working.
pub struct Gateway {
    provider: Option<Arc<dyn ChatProvider>>,
    model: String,
}

impl Gateway {
    pub fn new(provider: Option<Arc<dyn ChatProvider>>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        let provider = config.api_key.clone().map(|api_key| {
            Arc::new(OpenAiProvider::new(config.base_url.clone(), api_key)) as Arc<dyn ChatProvider>
        });

        if provider.is_none() {
            tracing::warn!("No AI gateway API key configured, tag and title generation will fail");
        }

        Self::new(provider, config.model.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Complete a conversation with the configured model
    pub async fn complete(&self, messages: Vec<Message>, temperature: Option<f64>) -> Result<String, ChatError> {
        let Some(provider) = &self.provider else {
            tracing::error!("AI gateway API key is not configured");
            return Err(ChatError::NotConfigured);
        };

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature,
        };

        tracing::debug!(provider = provider.name(), model = %self.model, "requesting completion");

        provider.complete(&request).await
    }
}
