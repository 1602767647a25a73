use forge_backend::{Backend, Caller, HasIdentity, IdentityService, Upload};

use crate::{
    error::{Result, TtsError},
    provider::{SynthesisRequest, TtsProvider, minimax::MiniMaxProvider},
    types::{SpeechRequest, SpeechResponse},
    voice::Voice,
};

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Speech synthesis server
pub struct Server {
    provider: Box<dyn TtsProvider>,
    backend: Backend,
    bucket: String,
    default_model: String,
    vault_key_name: String,
}

impl HasIdentity for Server {
    fn identity(&self) -> &dyn IdentityService {
        self.backend.identity.as_ref()
    }
}

impl Server {
    /// Synthesize a script with the caller's own provider key and store the MP3
    pub async fn synthesize(&self, caller: &Caller, request: SpeechRequest) -> Result<SpeechResponse> {
        let script = request
            .script
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TtsError::InvalidRequest("Script is required".to_string()))?;

        let api_key = match self.backend.secrets.user_api_key(&caller.user_id, &self.vault_key_name).await {
            Ok(Some(key)) => key,
            Ok(None) => return Err(TtsError::MissingUserKey),
            Err(e) => {
                tracing::warn!(user_id = %caller.user_id, error = %e, "vault lookup failed");
                return Err(TtsError::MissingUserKey);
            }
        };

        let voice = Voice::from_label(request.voice.as_deref().unwrap_or_default());
        let model = request.model.as_deref().filter(|m| !m.is_empty()).unwrap_or(&self.default_model);

        tracing::debug!(
            provider = self.provider.name(),
            voice = <&'static str>::from(voice),
            model,
            script_len = script.len(),
            "synthesizing speech"
        );

        let synthesis = self
            .provider
            .synthesize(
                &api_key,
                &SynthesisRequest {
                    model,
                    text: &script,
                    voice_id: voice.provider_id(),
                },
            )
            .await?;

        let path = format!(
            "{}/{}/{}_minimax_generated.mp3",
            caller.user_id,
            request.project_id.as_deref().filter(|p| !p.is_empty()).unwrap_or("temp"),
            jiff::Timestamp::now().as_millisecond()
        );

        let duration = synthesis.duration_secs(&script);

        self.backend
            .storage
            .upload(Upload {
                bucket: &self.bucket,
                path: &path,
                content_type: AUDIO_CONTENT_TYPE,
                upsert: true,
                bytes: synthesis.audio,
            })
            .await
            .map_err(|e| TtsError::UploadFailed(e.to_string()))?;

        let audio_url = self.backend.storage.public_url(&self.bucket, &path);

        tracing::debug!(audio_url = %audio_url, duration, "speech stored");

        Ok(SpeechResponse { audio_url, duration })
    }
}

/// Builder for constructing the TTS server from configuration
pub struct TtsServerBuilder<'a> {
    config: &'a forge_config::Config,
    backend: Backend,
}

impl<'a> TtsServerBuilder<'a> {
    pub const fn new(config: &'a forge_config::Config, backend: Backend) -> Self {
        Self { config, backend }
    }

    pub fn build(self) -> Result<Server> {
        let tts = &self.config.tts;
        let provider = MiniMaxProvider::new(tts.base_url.clone())?;

        tracing::debug!(default_model = %tts.default_model, "TTS server initialized");

        Ok(Server {
            provider: Box::new(provider),
            backend: self.backend,
            bucket: self.config.backend.buckets.audio.clone(),
            default_model: tts.default_model.clone(),
            vault_key_name: tts.vault_key_name.clone(),
        })
    }
}
