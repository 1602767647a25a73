use serde::Deserialize;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.minimax.io/v1";

/// Text-to-speech provider configuration
///
/// There is no server-wide key: every user brings their own, stored in the
/// backend vault under `vault_key_name`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsConfig {
    /// Base URL override
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Model used when a request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Vault key name holding each user's provider key
    #[serde(default = "default_vault_key_name")]
    pub vault_key_name: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_model: default_model(),
            vault_key_name: default_vault_key_name(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default TTS URL is valid")
}

fn default_model() -> String {
    "speech-2.6-hd".to_string()
}

fn default_vault_key_name() -> String {
    "minimax".to_string()
}
