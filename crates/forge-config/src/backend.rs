use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Managed backend configuration
///
/// A single project URL serves identity (`/auth/v1`), storage
/// (`/storage/v1`), the REST data API (`/rest/v1`) and the vault RPC.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Project base URL
    pub url: Url,
    /// Public key sent as `apikey` on user-scoped calls
    pub anon_key: SecretString,
    /// Privileged key for storage writes and vault lookups
    pub service_role_key: SecretString,
    /// Storage bucket names
    #[serde(default)]
    pub buckets: BucketConfig,
}

/// Storage bucket names
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketConfig {
    /// Synthesized speech
    #[serde(default = "default_audio_bucket")]
    pub audio: String,
    /// Thumbnail examples and character references
    #[serde(default = "default_style_bucket")]
    pub style_references: String,
    /// Generated thumbnails
    #[serde(default = "default_generated_bucket")]
    pub generated_images: String,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            audio: default_audio_bucket(),
            style_references: default_style_bucket(),
            generated_images: default_generated_bucket(),
        }
    }
}

fn default_audio_bucket() -> String {
    "audio-files".to_string()
}

fn default_style_bucket() -> String {
    "style-references".to_string()
}

fn default_generated_bucket() -> String {
    "generated-images".to_string()
}
