use forge_backend::{Backend, Caller, HasIdentity, IdentityService};

use crate::{
    error::Result,
    gateway::Gateway,
    tags::{self, TagsRequest, TagsResponse},
    titles::{self, ExampleTitlesRequest, TitlesRequest, TitlesResponse},
};

/// Text generation server for tags and titles
pub struct Server {
    gateway: Gateway,
    backend: Backend,
}

impl HasIdentity for Server {
    fn identity(&self) -> &dyn IdentityService {
        self.backend.identity.as_ref()
    }
}

impl Server {
    pub async fn tags(&self, caller: &Caller, request: TagsRequest) -> Result<TagsResponse> {
        tracing::debug!(user_id = %caller.user_id, "tag generation requested");

        tags::generate(&self.gateway, request).await
    }

    pub async fn titles(&self, request: TitlesRequest) -> Result<TitlesResponse> {
        titles::generate(&self.gateway, request).await
    }

    pub async fn titles_from_examples(&self, request: ExampleTitlesRequest) -> Result<TitlesResponse> {
        titles::generate_from_examples(&self.gateway, request).await
    }
}

/// Builder for constructing the text generation server from configuration
pub struct LlmServerBuilder<'a> {
    config: &'a forge_config::Config,
    backend: Backend,
}

impl<'a> LlmServerBuilder<'a> {
    pub const fn new(config: &'a forge_config::Config, backend: Backend) -> Self {
        Self { config, backend }
    }

    pub fn build(self) -> Server {
        let gateway = Gateway::from_config(&self.config.llm);

        tracing::debug!(model = gateway.model(), "LLM server initialized");

        Server {
            gateway,
            backend: self.backend,
        }
    }
}
