use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use forge_core::HttpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Speech synthesis errors
#[derive(Debug, Error)]
pub enum TtsError {
    /// Invalid request parameters
    #[error("{0}")]
    InvalidRequest(String),

    /// The caller has no provider key in the vault
    #[error("MiniMax API key not configured. Please add it in your profile.")]
    MissingUserKey,

    /// Provider answered with a non-success HTTP status
    #[error("MiniMax API error: {status}")]
    ProviderHttpError { status: u16 },

    /// Provider answered 200 but reported a failure in its envelope
    #[error("MiniMax API error: {0}")]
    ProviderApiError(String),

    /// Provider response carried no usable audio
    #[error("No audio data in response")]
    NoAudio,

    /// Provider audio was not valid hex
    #[error("Invalid audio data in response: {0}")]
    InvalidAudio(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Writing the audio to storage failed
    #[error("Failed to upload audio: {0}")]
    UploadFailed(String),

    /// Internal failure whose details stay in the logs
    #[error("Internal server error")]
    InternalError,
}

impl HttpError for TtsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::MissingUserKey => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) => "validation_error",
            Self::MissingUserKey => "configuration_error",
            Self::ProviderHttpError { .. }
            | Self::ProviderApiError(_)
            | Self::NoAudio
            | Self::InvalidAudio(_)
            | Self::ConnectionError(_) => "provider_error",
            Self::UploadFailed(_) | Self::InternalError => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        forge_core::error_response(&self)
    }
}
