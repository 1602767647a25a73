#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod auth;
mod error;
mod identity;
mod jobs;
mod memory;
mod rest;
mod secrets;
mod storage;

use std::sync::Arc;

pub use auth::{AuthError, Caller, HasIdentity};
pub use error::BackendError;
pub use identity::IdentityService;
pub use jobs::JobStore;
pub use memory::{MemoryBackend, StoredObject};
pub use rest::RestBackend;
pub use secrets::SecretStore;
pub use storage::{ObjectStore, Upload};

use forge_config::BackendConfig;

/// Handles to every backend service, shared by the feature servers
#[derive(Clone)]
pub struct Backend {
    pub identity: Arc<dyn IdentityService>,
    pub storage: Arc<dyn ObjectStore>,
    pub jobs: Arc<dyn JobStore>,
    pub secrets: Arc<dyn SecretStore>,
}

impl Backend {
    /// Connect to the managed backend described by `config`
    pub fn from_config(config: &BackendConfig) -> anyhow::Result<Self> {
        let rest = Arc::new(RestBackend::new(config)?);
        Ok(Self::from_shared(rest))
    }

    /// Serve every service from one implementation
    pub fn from_shared<T>(inner: Arc<T>) -> Self
    where
        T: IdentityService + ObjectStore + JobStore + SecretStore + 'static,
    {
        Self {
            identity: Arc::clone(&inner) as Arc<dyn IdentityService>,
            storage: Arc::clone(&inner) as Arc<dyn ObjectStore>,
            jobs: Arc::clone(&inner) as Arc<dyn JobStore>,
            secrets: inner,
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}
