#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod provider;
mod server;
mod types;
mod voice;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use forge_backend::{Backend, Caller};
use forge_core::JsonPayload;

pub use error::{Result, TtsError};
pub use server::{Server, TtsServerBuilder};
pub use types::{SpeechRequest, SpeechResponse};
pub use voice::Voice;

/// Build the TTS server from configuration
pub fn build_server(config: &forge_config::Config, backend: Backend) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        TtsServerBuilder::new(config, backend)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize TTS server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for TTS
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/functions/v1/generate-audio-minimax", post(synthesize))
}

/// Handle speech synthesis requests
async fn synthesize(
    State(server): State<Arc<Server>>,
    caller: Caller,
    JsonPayload(request): JsonPayload<SpeechRequest>,
) -> Result<Json<SpeechResponse>> {
    let response = server.synthesize(&caller, request).await?;

    tracing::debug!("Speech synthesis complete");

    Ok(Json(response))
}
