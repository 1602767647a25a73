/// Errors returned by backend services
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The identity service rejected the caller's token
    #[error("invalid or expired session")]
    Unauthorized,

    /// HTTP request to the backend failed
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend returned a non-success response
    #[error("backend error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the backend
        message: String,
    },

    /// Client could not be constructed from configuration
    #[error("invalid backend configuration: {0}")]
    Config(String),

    /// Backend response could not be decoded
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}
