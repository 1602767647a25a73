#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod error;
mod provider;
mod server;
mod types;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use forge_core::JsonPayload;
use serde_json::{Map, Value};

pub use error::{ImageGenError, Result};
pub use types::{ImageGenResponse, ImageRequest, ImageResponse};

pub use server::{ImageGenServerBuilder, Server};

/// Build the image generation server from configuration
pub fn build_server(config: &forge_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        ImageGenServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize image generation server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for image generation
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/functions/v1/generate-image-seedream", post(generate))
}

/// Handle image generation and prediction status requests
async fn generate(
    State(server): State<Arc<Server>>,
    JsonPayload(body): JsonPayload<Map<String, Value>>,
) -> Result<Json<ImageGenResponse>> {
    let request = ImageRequest::from_body(&body);
    let response = server.generate(&request).await?;

    tracing::debug!("Image generation handler complete");

    Ok(Json(response))
}
