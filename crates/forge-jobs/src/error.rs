use axum::response::{IntoResponse, Response};
use forge_core::HttpError;
use http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JobsError>;

#[derive(Debug, Error)]
pub enum JobsError {
    #[error("jobId or projectId is required")]
    MissingSelector,

    #[error("Job not found")]
    NotFound,

    /// The job table query failed
    #[error("Failed to fetch jobs")]
    Backend(#[source] forge_backend::BackendError),
}

impl HttpError for JobsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingSelector => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::MissingSelector => "validation_error",
            Self::NotFound => "not_found_error",
            Self::Backend(_) => "backend_error",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for JobsError {
    fn into_response(self) -> Response {
        forge_core::error_response(&self)
    }
}
