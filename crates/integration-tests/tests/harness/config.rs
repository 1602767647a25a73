//! Configuration builder for integration tests
//!
//! Every upstream (backend, image provider, speech provider and chat
//! gateway) points at the same [`MockPlatform`](super::mock_platform::MockPlatform).

use forge_config::Config;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    platform_url: String,
    health: bool,
    llm_key: bool,
    cors: Option<String>,
}

impl ConfigBuilder {
    /// Create a new builder with every upstream at `platform_url`
    pub fn new(platform_url: &str) -> Self {
        Self {
            platform_url: platform_url.to_owned(),
            health: true,
            llm_key: true,
            cors: None,
        }
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.health = false;
        self
    }

    /// Leave the chat gateway key unset
    pub fn without_llm_key(mut self) -> Self {
        self.llm_key = false;
        self
    }

    /// Replace the `[server.cors]` table body
    pub fn with_cors(mut self, table: &str) -> Self {
        self.cors = Some(table.to_owned());
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        let url = &self.platform_url;
        let llm_key = if self.llm_key { "api_key = \"gw-key\"" } else { "" };
        let cors = self
            .cors
            .map(|table| format!("[server.cors]\n{table}\n"))
            .unwrap_or_default();

        let raw = format!(
            r#"
[server]
listen_address = "127.0.0.1:0"

[server.health]
enabled = {health}

{cors}

[backend]
url = "{url}"
anon_key = "anon"
service_role_key = "service"

[imagegen]
api_key = "rp-key"
base_url = "{url}/v1"

[tts]
base_url = "{url}/v1"

[llm]
{llm_key}
base_url = "{url}/v1"
"#,
            health = self.health,
        );

        Config::parse(&raw).expect("test configuration is valid")
    }
}
