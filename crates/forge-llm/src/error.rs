use axum::response::{IntoResponse, Response};
use http::StatusCode;
use forge_core::HttpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors returned by the text generation functions
#[derive(Debug, Error)]
pub enum LlmError {
    /// Client sent a malformed or invalid request
    #[error("{0}")]
    InvalidRequest(String),

    /// Gateway answered 429
    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    /// Gateway answered 402
    #[error("Insufficient credits, please add funds")]
    PaymentRequired,

    /// Gateway failed or returned no usable content
    #[error("{0}")]
    Generation(String),

    /// Reply could not be reduced to the expected JSON shape
    #[error("{0}")]
    Parse(String),

    /// Server-side gateway configuration is incomplete
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HttpError for LlmError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            Self::Generation(_) | Self::Parse(_) | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) => "validation_error",
            Self::RateLimited => "rate_limit_error",
            Self::PaymentRequired => "payment_required",
            Self::Generation(_) => "provider_error",
            Self::Parse(_) => "parse_error",
            Self::Config(_) => "configuration_error",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for LlmError {
    fn into_response(self) -> Response {
        forge_core::error_response(&self)
    }
}
