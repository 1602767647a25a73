//! Tag and title generation over an OpenAI-compatible chat gateway
//!
//! Three functions share one configured model: SEO tags for a script, titles
//! drawn from a catalogue of proven structures, and titles that mimic the
//! style of caller-supplied examples. Replies are reduced to JSON with the
//! tolerant extractors in [`extract`].

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
pub mod extract;
mod gateway;
pub mod provider;
mod server;
pub mod tags;
pub mod titles;
pub mod types;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use forge_backend::{Backend, Caller};
use forge_core::JsonPayload;

pub use error::{LlmError, Result};
pub use gateway::Gateway;
pub use server::{LlmServerBuilder, Server};
pub use tags::{TagsRequest, TagsResponse};
pub use titles::{ExampleTitlesRequest, TitlesRequest, TitlesResponse};

/// Build the text generation server from configuration
pub fn build_server(config: &forge_config::Config, backend: Backend) -> Arc<Server> {
    Arc::new(LlmServerBuilder::new(config, backend).build())
}

/// Create the endpoint router for tags and titles
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new()
        .route("/functions/v1/generate-tags", post(generate_tags))
        .route("/functions/v1/generate-titles", post(generate_titles))
        .route(
            "/functions/v1/generate-titles-from-examples",
            post(generate_titles_from_examples),
        )
}

async fn generate_tags(
    State(server): State<Arc<Server>>,
    caller: Caller,
    JsonPayload(request): JsonPayload<TagsRequest>,
) -> Result<Json<TagsResponse>> {
    Ok(Json(server.tags(&caller, request).await?))
}

async fn generate_titles(
    State(server): State<Arc<Server>>,
    JsonPayload(request): JsonPayload<TitlesRequest>,
) -> Result<Json<TitlesResponse>> {
    Ok(Json(server.titles(request).await?))
}

async fn generate_titles_from_examples(
    State(server): State<Arc<Server>>,
    JsonPayload(request): JsonPayload<ExampleTitlesRequest>,
) -> Result<Json<TitlesResponse>> {
    Ok(Json(server.titles_from_examples(request).await?))
}
