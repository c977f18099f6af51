use std::time::Instant;

use polyvox_config::{Config, TtsConfig};
use polyvox_core::{CancellationToken, GoogleCredentials};
use polyvox_telemetry::{KeyValue, metrics};

use crate::{
    error::TtsError,
    provider::{SpeechSynthesizer, google::GoogleTts},
    tiers,
    types::{SpeechPayload, SynthesisResult},
};

/// Synthesis server: request defaults, the cascade, and the Google backend
pub struct Server {
    synthesizer: Box<dyn SpeechSynthesizer>,
    config: TtsConfig,
    shutdown: CancellationToken,
}

impl Server {
    /// Synthesize a request through the tier cascade
    ///
    /// The wait on long-running work is abandoned when the server shuts
    /// down.
    pub async fn synthesize(&self, payload: SpeechPayload) -> crate::error::Result<SynthesisResult> {
        if payload.input.trim().is_empty() {
            return Err(TtsError::InvalidRequest("input must not be empty".to_string()));
        }

        let request = payload.into_request(&self.config);
        let cancel = self.shutdown.child_token();
        let started = Instant::now();

        let result = tiers::synthesize(self.synthesizer.as_ref(), &self.config, &request, &cancel).await?;

        let attributes = [KeyValue::new("method", result.method.as_str())];
        metrics::counter(metrics::TTS_SYNTHESIS_COUNT).add(1, &attributes);
        metrics::record_duration(&metrics::histogram(metrics::TTS_SYNTHESIS_DURATION), started, &attributes);

        Ok(result)
    }
}

/// Builder for constructing the synthesis server from configuration
pub struct TtsServerBuilder<'a> {
    config: &'a Config,
    shutdown: CancellationToken,
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
}

impl<'a> TtsServerBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
            synthesizer: None,
        }
    }

    /// Token whose cancellation aborts in-flight long-running waits
    #[must_use]
    pub fn shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Use `synthesizer` instead of Google
    #[must_use]
    pub fn synthesizer(mut self, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn build(self) -> crate::error::Result<Server> {
        let synthesizer = match self.synthesizer {
            Some(synthesizer) => synthesizer,
            None => {
                let google = &self.config.google;
                let credentials = GoogleCredentials::resolve(google.api_key.as_ref(), google.access_token.as_ref())
                    .ok_or_else(|| {
                        TtsError::ConfigMissing("google.api_key or google.access_token is required".to_string())
                    })?;

                tracing::debug!(
                    "Google TTS configured (long audio {})",
                    if google.project_id().is_some() && google.storage_bucket().is_some() {
                        "enabled"
                    } else {
                        "unavailable"
                    }
                );

                Box::new(GoogleTts::new(credentials, google, &self.config.tts.long_audio))
            }
        };

        Ok(Server {
            synthesizer,
            config: self.config.tts.clone(),
            shutdown: self.shutdown,
        })
    }
}
