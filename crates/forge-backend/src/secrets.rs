use async_trait::async_trait;
use secrecy::SecretString;

use crate::BackendError;

/// Per-user provider keys kept in the backend vault
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Look up the key a user stored for `key_name`, if any
    async fn user_api_key(&self, user_id: &str, key_name: &str) -> Result<Option<SecretString>, BackendError>;
}
