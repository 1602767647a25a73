use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::ImageGenProvider;
use crate::{
    error::{ImageGenError, Result},
    types::PredictionInput,
};

/// Replicate predictions API
pub(crate) struct ReplicateProvider {
    client: Client,
    api_key: SecretString,
    base_url: Url,
    owner: String,
    model: String,
    poll_interval: Duration,
}

#[derive(Serialize)]
struct CreatePredictionRequest<'a> {
    input: &'a PredictionInput,
}

/// The subset of a prediction this provider interprets
#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Value,
}

impl Prediction {
    fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "failed" | "canceled")
    }
}

impl ReplicateProvider {
    /// `model` must be in `owner/name` form
    pub fn new(api_key: SecretString, base_url: Url, model: &str, poll_interval: Duration) -> Result<Self> {
        let (owner, name) = model
            .split_once('/')
            .ok_or_else(|| ImageGenError::ConfigError(format!("model `{model}` is not in owner/name form")))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url,
            owner: owner.to_string(),
            model: name.to_string(),
            poll_interval,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = "replicate", error = %e, "prediction request failed");
                ImageGenError::ConnectionError(format!("Failed to send request to Replicate: {e}"))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!(provider = "replicate", status = %status, "Replicate API error");

            return Err(ImageGenError::ProviderApiError {
                status: status.as_u16(),
                message: error_detail(&error_text),
            });
        }

        Ok(response)
    }

    async fn get_prediction(&self, id: &str) -> Result<Prediction> {
        let url = self.endpoint(&["predictions", id]);
        let response = self.send(self.client.get(url)).await?;

        response.json().await.map_err(|e| {
            tracing::error!(provider = "replicate", error = %e, "failed to parse prediction");
            ImageGenError::InternalError
        })
    }
}

#[async_trait]
impl ImageGenProvider for ReplicateProvider {
    async fn run(&self, input: &PredictionInput) -> Result<Vec<String>> {
        let url = self.endpoint(&["models", &self.owner, &self.model, "predictions"]);

        tracing::debug!(
            provider = "replicate",
            model = %format_args!("{}/{}", self.owner, self.model),
            "creating prediction"
        );

        let response = self
            .send(
                self.client
                    .post(url)
                    .header("Prefer", "wait")
                    .json(&CreatePredictionRequest { input }),
            )
            .await?;

        let mut prediction: Prediction = response.json().await.map_err(|e| {
            tracing::error!(provider = "replicate", error = %e, "failed to parse prediction");
            ImageGenError::InternalError
        })?;

        while !prediction.is_terminal() {
            tracing::debug!(provider = "replicate", id = %prediction.id, status = %prediction.status, "waiting for prediction");
            tokio::time::sleep(self.poll_interval).await;
            prediction = self.get_prediction(&prediction.id).await?;
        }

        if prediction.status != "succeeded" {
            let message = match &prediction.error {
                Value::String(message) if !message.is_empty() => message.clone(),
                Value::Null => "no error details".to_string(),
                other => other.to_string(),
            };

            return Err(ImageGenError::PredictionFailed {
                status: prediction.status,
                message,
            });
        }

        tracing::debug!(provider = "replicate", id = %prediction.id, "prediction succeeded");

        Ok(output_urls(prediction.output))
    }

    async fn prediction(&self, id: &str) -> Result<Value> {
        let url = self.endpoint(&["predictions", id]);
        let response = self.send(self.client.get(url)).await?;

        response.json().await.map_err(|e| {
            tracing::error!(provider = "replicate", error = %e, "failed to parse prediction");
            ImageGenError::InternalError
        })
    }

    fn name(&self) -> &str {
        "replicate"
    }
}

/// Normalize a prediction output to a list of URLs
fn output_urls(output: Value) -> Vec<String> {
    match output {
        Value::String(url) => vec![url],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(url) => Some(url),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Pull the human-readable part out of a Replicate error body
fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
