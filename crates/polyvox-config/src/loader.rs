use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// `{{ env.VAR }}` placeholders are expanded before parsing, and the
    /// parsed result is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot be
    /// resolved, the TOML is malformed, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Check that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_credentials()?;
        self.validate_tts()?;
        self.validate_subtitles()?;
        self.validate_cors()?;
        Ok(())
    }

    fn validate_credentials(&self) -> anyhow::Result<()> {
        let has_key = self.google.api_key.as_ref().is_some_and(|k| !k.expose_secret().is_empty());
        let has_token = self
            .google
            .access_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty());

        if !has_key && !has_token {
            anyhow::bail!("google.api_key or google.access_token must be configured");
        }

        if self.google.project_id().is_none() {
            tracing::warn!("google.project_id is not set, long-audio synthesis will fall back to chunking");
        }

        Ok(())
    }

    fn validate_tts(&self) -> anyhow::Result<()> {
        if self.tts.standard_max_bytes == 0 {
            anyhow::bail!("tts.standard_max_bytes must be greater than 0");
        }

        if self.tts.default_voice_name.trim().is_empty() {
            anyhow::bail!("tts.default_voice_name must not be empty");
        }

        let long_audio = &self.tts.long_audio;
        if long_audio.poll_interval.is_zero() || long_audio.poll_interval > long_audio.max_wait {
            anyhow::bail!("tts.long_audio.poll_interval must be non-zero and not exceed max_wait");
        }

        Ok(())
    }

    fn validate_subtitles(&self) -> anyhow::Result<()> {
        if self.subtitles.words_per_cue == 0 {
            anyhow::bail!("subtitles.words_per_cue must be greater than 0");
        }

        if self.subtitles.poll_interval.is_zero() || self.subtitles.poll_interval > self.subtitles.max_wait {
            anyhow::bail!("subtitles.poll_interval must be non-zero and not exceed max_wait");
        }

        Ok(())
    }

    fn validate_cors(&self) -> anyhow::Result<()> {
        let Some(cors) = &self.server.cors else {
            return Ok(());
        };

        for origin in cors.allow_origins.iter().filter(|origin| origin.as_str() != "*") {
            let parsed = url::Url::parse(origin)
                .map_err(|e| anyhow::anyhow!("server.cors.allow_origins: invalid origin '{origin}': {e}"))?;

            if parsed.host_str().is_none() || parsed.path() != "/" {
                anyhow::bail!("server.cors.allow_origins: '{origin}' must be scheme://host[:port]");
            }
        }

        Ok(())
    }
}
