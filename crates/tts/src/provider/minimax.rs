use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{SynthesisRequest, TtsProvider};
use crate::{
    error::{Result, TtsError},
    types::Synthesis,
};

/// `MiniMax` T2A v2 provider
pub struct MiniMaxProvider {
    client: Client,
    base_url: Url,
}

impl MiniMaxProvider {
    pub fn new(base_url: Url) -> Result<Self> {
        let client = Client::builder().build().map_err(|e| {
            tracing::error!("Failed to build MiniMax HTTP client: {e}");
            TtsError::InternalError
        })?;

        Ok(Self { client, base_url })
    }
}

#[derive(Serialize)]
struct T2aRequest<'a> {
    model: &'a str,
    text: &'a str,
    stream: bool,
    language_boost: &'static str,
    output_format: &'static str,
    voice_setting: VoiceSetting<'a>,
    audio_setting: AudioSetting,
}

#[derive(Serialize)]
struct VoiceSetting<'a> {
    voice_id: &'a str,
    speed: u32,
    vol: u32,
    pitch: i32,
}

#[derive(Serialize)]
struct AudioSetting {
    sample_rate: u32,
    bitrate: u32,
    format: &'static str,
    channel: u32,
}

#[derive(Deserialize)]
struct T2aResponse {
    #[serde(default)]
    data: Option<T2aData>,
    #[serde(default)]
    extra_info: Option<ExtraInfo>,
    #[serde(default)]
    base_resp: Option<BaseResp>,
}

#[derive(Deserialize)]
struct T2aData {
    #[serde(default)]
    audio: Option<String>,
}

#[derive(Deserialize)]
struct ExtraInfo {
    #[serde(default)]
    audio_length: Option<serde_json::Number>,
}

#[derive(Deserialize)]
struct BaseResp {
    status_code: i64,
    #[serde(default)]
    status_msg: Option<String>,
}

impl<'a> T2aRequest<'a> {
    fn new(request: &SynthesisRequest<'a>) -> Self {
        Self {
            model: request.model,
            text: request.text,
            stream: false,
            language_boost: "auto",
            output_format: "hex",
            voice_setting: VoiceSetting {
                voice_id: request.voice_id,
                speed: 1,
                vol: 1,
                pitch: 0,
            },
            audio_setting: AudioSetting {
                sample_rate: 32_000,
                bitrate: 128_000,
                format: "mp3",
                channel: 1,
            },
        }
    }
}

/// Decode hex-encoded audio, rejecting empty results
pub(crate) fn decode_audio(hex_audio: Option<&str>) -> Result<Bytes> {
    let hex_audio = hex_audio.filter(|h| !h.is_empty()).ok_or(TtsError::NoAudio)?;

    let audio = hex::decode(hex_audio).map_err(|e| TtsError::InvalidAudio(e.to_string()))?;

    if audio.is_empty() {
        return Err(TtsError::NoAudio);
    }

    Ok(Bytes::from(audio))
}

#[async_trait]
impl TtsProvider for MiniMaxProvider {
    async fn synthesize(&self, api_key: &SecretString, request: &SynthesisRequest<'_>) -> Result<Synthesis> {
        let url = format!("{}/t2a_v2", self.base_url.as_str().trim_end_matches('/'));

        tracing::debug!(
            model = request.model,
            voice_id = request.voice_id,
            script_len = request.text.len(),
            "MiniMax TTS request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&T2aRequest::new(request))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("MiniMax request failed: {e}");
                TtsError::ConnectionError(format!("Failed to send request to MiniMax: {e}"))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!("MiniMax API error ({status}): {error_text}");

            return Err(TtsError::ProviderHttpError {
                status: status.as_u16(),
            });
        }

        let body: T2aResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse MiniMax response: {e}");
            TtsError::InternalError
        })?;

        match body.base_resp {
            Some(ref base) if base.status_code == 0 => {}
            other => {
                let message = other
                    .and_then(|b| b.status_msg)
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "Unknown error".to_string());

                tracing::error!("MiniMax API error: {message}");

                return Err(TtsError::ProviderApiError(message));
            }
        }

        let audio = decode_audio(body.data.as_ref().and_then(|d| d.audio.as_deref()))?;

        let audio_length_ms = body
            .extra_info
            .and_then(|info| info.audio_length)
            .and_then(|length| length.as_f64());

        tracing::debug!("MiniMax TTS synthesis complete, {} bytes", audio.len());

        Ok(Synthesis { audio, audio_length_ms })
    }

    fn name(&self) -> &str {
        "minimax"
    }
}
