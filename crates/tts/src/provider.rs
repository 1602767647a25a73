pub mod minimax;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::types::Synthesis;

/// Provider-level synthesis parameters
#[derive(Debug, Clone)]
pub struct SynthesisRequest<'a> {
    pub model: &'a str,
    pub text: &'a str,
    pub voice_id: &'a str,
}

/// Trait for TTS provider implementations
///
/// Keys are per user, so each call carries the caller's key.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Synthesize text to MP3 audio
    async fn synthesize(&self, api_key: &SecretString, request: &SynthesisRequest<'_>) -> crate::error::Result<Synthesis>;

    /// Get the provider name
    fn name(&self) -> &str;
}
