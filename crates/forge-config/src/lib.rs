#![allow(clippy::must_use_candidate)]

pub mod backend;
pub mod cors;
mod env;
pub mod health;
pub mod imagegen;
pub mod llm;
mod loader;
pub mod server;
pub mod telemetry;
pub mod tts;

use serde::Deserialize;

pub use backend::*;
pub use cors::*;
pub use health::*;
pub use imagegen::*;
pub use llm::*;
pub use server::*;
pub use telemetry::TelemetryConfig;
pub use tts::*;

/// Top-level Forge configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Managed backend (identity, storage, database, vault)
    pub backend: BackendConfig,
    /// Image generation provider
    #[serde(default)]
    pub imagegen: ImageGenConfig,
    /// Text-to-speech provider
    #[serde(default)]
    pub tts: TtsConfig,
    /// LLM chat gateway used for tags and titles
    #[serde(default)]
    pub llm: LlmConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
