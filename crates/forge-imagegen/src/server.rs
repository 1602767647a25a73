use crate::{
    error::{ImageGenError, Result},
    provider::{ImageGenProvider, replicate::ReplicateProvider},
    types::{ImageGenResponse, ImageRequest, ImageResponse, PredictionInput},
};

/// Image generation server
///
/// The provider is optional so the gateway can start without an image
/// key; calls then fail with a configuration error.
pub struct Server {
    provider: Option<Box<dyn ImageGenProvider>>,
}

impl Server {
    /// Handle a generate-image call
    ///
    /// A `predictionId` turns the call into a status check and every other
    /// field is ignored.
    pub async fn generate(&self, request: &ImageRequest) -> Result<ImageGenResponse> {
        if let Some(id) = request.prediction_id.as_deref().filter(|id| !id.is_empty()) {
            let provider = self.provider()?;
            tracing::debug!(provider = provider.name(), prediction_id = id, "checking prediction status");
            return provider.prediction(id).await.map(ImageGenResponse::Prediction);
        }

        let input = PredictionInput::from_request(request).ok_or_else(|| {
            ImageGenError::InvalidRequest("Missing required field: prompt is required".to_string())
        })?;

        let provider = self.provider()?;

        tracing::debug!(
            provider = provider.name(),
            width = input.width,
            height = input.height,
            num_outputs = input.num_outputs,
            references = input.image_urls.len(),
            "generating image"
        );

        let output = provider.run(&input).await?;

        Ok(ImageGenResponse::Output(ImageResponse { output }))
    }

    fn provider(&self) -> Result<&dyn ImageGenProvider> {
        self.provider
            .as_deref()
            .ok_or_else(|| ImageGenError::ConfigError("image generation API key is not configured".to_string()))
    }
}

/// Builder for constructing the image generation server from configuration
pub struct ImageGenServerBuilder<'a> {
    config: &'a forge_config::Config,
}

impl<'a> ImageGenServerBuilder<'a> {
    pub fn new(config: &'a forge_config::Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<Server> {
        let config = &self.config.imagegen;

        let Some(api_key) = config.api_key.clone() else {
            tracing::warn!("No image generation API key configured, generate-image calls will fail");
            return Ok(Server { provider: None });
        };

        let provider = ReplicateProvider::new(api_key, config.base_url.clone(), &config.model, config.poll_interval)?;

        tracing::debug!(model = %config.model, "Image generation server initialized");

        Ok(Server {
            provider: Some(Box::new(provider)),
        })
    }
}
