use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use forge_core::HttpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImageGenError>;

/// Image generation errors
///
/// Everything except a malformed request surfaces as a 500 carrying the
/// provider's own message.
#[derive(Debug, Error)]
pub enum ImageGenError {
    /// Invalid request parameters
    #[error("{0}")]
    InvalidRequest(String),

    /// Provider API returned an error
    #[error("Image generation API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// The prediction finished without succeeding
    #[error("Prediction {status}: {message}")]
    PredictionFailed { status: String, message: String },

    /// Network or connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal failure whose details stay in the logs
    #[error("Internal server error")]
    InternalError,
}

impl HttpError for ImageGenError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) => "validation_error",
            Self::ConnectionError(_) | Self::ProviderApiError { .. } | Self::PredictionFailed { .. } => {
                "provider_error"
            }
            Self::ConfigError(_) => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for ImageGenError {
    fn into_response(self) -> Response {
        forge_core::error_response(&self)
    }
}
