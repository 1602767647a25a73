#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod server;
mod types;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use forge_backend::{Backend, Caller};
use forge_core::JsonPayload;

pub use error::{JobsError, Result};
pub use server::Server;
pub use types::{JobStatusRequest, JobStatusResponse, ProjectJobs};

pub fn build_server(backend: Backend) -> Arc<Server> {
    Arc::new(Server::new(backend))
}

/// Create the endpoint router for job status
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/functions/v1/get-job-status", post(job_status))
}

async fn job_status(
    State(server): State<Arc<Server>>,
    caller: Caller,
    JsonPayload(request): JsonPayload<JobStatusRequest>,
) -> Result<Json<JobStatusResponse>> {
    Ok(Json(server.status(&caller, request).await?))
}
