use async_trait::async_trait;

use crate::BackendError;

/// Resolves a caller's bearer token to a user id
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Validate the raw `Authorization` header value and return the user id
    async fn user_id(&self, authorization: &str) -> Result<String, BackendError>;
}
