use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    response::{IntoResponse, Response},
};
use forge_core::{HttpError, error_response};
use http::{StatusCode, header, request::Parts};

use crate::{BackendError, IdentityService};

/// State that can authenticate callers
pub trait HasIdentity {
    fn identity(&self) -> &dyn IdentityService;
}

impl<T: HasIdentity> HasIdentity for Arc<T> {
    fn identity(&self) -> &dyn IdentityService {
        (**self).identity()
    }
}

/// Authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header on the request
    #[error("No authorization header")]
    MissingHeader,

    /// The identity service did not accept the token
    #[error("Unauthorized")]
    Unauthorized,
}

impl HttpError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_type(&self) -> &str {
        "authentication_error"
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        error_response(&self)
    }
}

/// An authenticated caller
///
/// Extracting a `Caller` validates the `Authorization` header with the
/// identity service before the request body is read.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    /// The raw header value, forwarded on user-scoped backend queries
    pub authorization: String,
}

impl<S> FromRequestParts<S> for Caller
where
    S: HasIdentity + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AuthError::Unauthorized)?
            .to_owned();

        match state.identity().user_id(&authorization).await {
            Ok(user_id) => Ok(Self { user_id, authorization }),
            Err(BackendError::Unauthorized) => Err(AuthError::Unauthorized),
            Err(e) => {
                tracing::warn!(error = %e, "identity check failed");
                Err(AuthError::Unauthorized)
            }
        }
    }
}
