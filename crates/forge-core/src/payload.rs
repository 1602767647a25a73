use axum::{
    Json,
    body::Body,
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::ErrorBody;

/// Extractor for JSON request bodies
///
/// Unlike `axum::Json` this does not insist on a `Content-Type` header,
/// since browser clients of the functions are inconsistent about it, and
/// it rejects with the same `{"error": "..."}` body the handlers use.
pub struct JsonPayload<T>(pub T);

/// Body limit for function requests (1 MiB)
const BODY_LIMIT_BYTES: usize = 1 << 20;

impl<S, T: DeserializeOwned> FromRequest<S> for JsonPayload<T>
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(request.into_body(), BODY_LIMIT_BYTES)
            .await
            .map_err(|err| {
                if std::error::Error::source(&err)
                    .is_some_and(|source| source.is::<http_body_util::LengthLimitError>())
                {
                    reject(format!("Request body is too large, limit is {BODY_LIMIT_BYTES} bytes"))
                } else {
                    reject(format!("Failed to read request body: {err}"))
                }
            })?;

        serde_json::from_slice::<T>(&bytes)
            .map(Self)
            .map_err(|e| reject(format!("Failed to parse request body: {e}")))
    }
}

fn reject(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message))).into_response()
}
