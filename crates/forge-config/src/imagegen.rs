use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";

/// Image generation provider configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageGenConfig {
    /// Provider API key
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Model in `owner/name` form
    #[serde(default = "default_model")]
    pub model: String,
    /// Delay between prediction status polls (e.g. "500ms", "1s")
    #[serde(
        default = "default_poll_interval",
        deserialize_with = "duration_str::deserialize_duration"
    )]
    pub poll_interval: Duration,
}

impl Default for ImageGenConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default image generation URL is valid")
}

fn default_model() -> String {
    "bytedance/seedream-4".to_string()
}

const fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}
