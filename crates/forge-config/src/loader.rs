use std::path::Path;

use secrecy::ExposeSecret;

use crate::{AnyOrArray, Config};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_cors()?;
        self.validate_backend()?;
        self.validate_providers()?;
        self.validate_telemetry()?;
        Ok(())
    }

    fn validate_cors(&self) -> anyhow::Result<()> {
        let cors = &self.server.cors;

        if cors.credentials
            && [&cors.origins, &cors.methods, &cors.headers]
                .iter()
                .any(|v| matches!(v, AnyOrArray::Any))
        {
            anyhow::bail!("server.cors.credentials requires explicit origins, methods and headers");
        }

        Ok(())
    }

    fn validate_backend(&self) -> anyhow::Result<()> {
        let backend = &self.backend;

        if !matches!(backend.url.scheme(), "http" | "https") {
            anyhow::bail!("backend.url must use http or https, got `{}`", backend.url.scheme());
        }

        if backend.anon_key.expose_secret().is_empty() {
            anyhow::bail!("backend.anon_key must not be empty");
        }

        if backend.service_role_key.expose_secret().is_empty() {
            anyhow::bail!("backend.service_role_key must not be empty");
        }

        let buckets = &backend.buckets;
        for (name, value) in [
            ("audio", &buckets.audio),
            ("style_references", &buckets.style_references),
            ("generated_images", &buckets.generated_images),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("backend.buckets.{name} must not be empty");
            }
        }

        Ok(())
    }

    fn validate_providers(&self) -> anyhow::Result<()> {
        if self.imagegen.poll_interval.is_zero() {
            anyhow::bail!("imagegen.poll_interval must be greater than 0");
        }

        match self.imagegen.model.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {}
            _ => anyhow::bail!("imagegen.model must be in `owner/name` form, got `{}`", self.imagegen.model),
        }

        if self.tts.default_model.trim().is_empty() {
            anyhow::bail!("tts.default_model must not be empty");
        }

        if self.llm.model.trim().is_empty() {
            anyhow::bail!("llm.model must not be empty");
        }

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        let Some(rate) = self
            .telemetry
            .as_ref()
            .and_then(|t| t.tracing.as_ref())
            .map(|t| t.sampling_rate)
        else {
            return Ok(());
        };

        if !(0.0..=1.0).contains(&rate) {
            anyhow::bail!("telemetry.tracing.sampling_rate must be between 0.0 and 1.0, got {rate}");
        }

        Ok(())
    }
}
