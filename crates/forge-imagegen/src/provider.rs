pub(crate) mod replicate;

use async_trait::async_trait;
use serde_json::Value;

use crate::{error::Result, types::PredictionInput};

/// Trait for image generation provider implementations
#[async_trait]
pub(crate) trait ImageGenProvider: Send + Sync {
    /// Run the model to completion and return its output URLs
    async fn run(&self, input: &PredictionInput) -> Result<Vec<String>>;

    /// Fetch a prediction by id, as the provider returns it
    async fn prediction(&self, id: &str) -> Result<Value>;

    /// Get the provider name
    fn name(&self) -> &str;
}
