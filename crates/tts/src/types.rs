use serde::{Deserialize, Serialize};

/// Body of a generate-audio call
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    /// Text to synthesize
    #[serde(default)]
    pub script: Option<String>,
    /// Voice label such as `english_narrator`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Provider model, e.g. `speech-2.6-hd` or `speech-2.6-turbo`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Project the audio belongs to; `temp` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// Where the synthesized audio ended up
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResponse {
    /// Public URL of the uploaded MP3
    pub audio_url: String,
    /// Length in whole seconds
    pub duration: u64,
}

/// Decoded audio returned by a provider
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub audio: bytes::Bytes,
    /// Audio length as reported by the provider, in milliseconds
    pub audio_length_ms: Option<f64>,
}

impl Synthesis {
    /// Duration in seconds, estimated at 2.5 words per second when the
    /// provider did not report a positive length
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn duration_secs(&self, script: &str) -> u64 {
        match self.audio_length_ms.filter(|ms| ms.is_finite() && *ms > 0.0) {
            Some(ms) => (ms / 1000.0).round() as u64,
            None => {
                let words = u64::try_from(script.split_whitespace().count()).unwrap_or(u64::MAX / 4);
                // round(words / 2.5) in integer arithmetic
                (words * 4 + 5) / 10
            }
        }
    }
}
