//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use polyvox_config::{Config, GoogleConfig, GoogleEndpoints, HealthConfig, ServerConfig};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal configuration with every Google service pointed at `base_url`
    pub fn new(base_url: &str) -> Self {
        let mut config = Config {
            server: ServerConfig {
                listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                health: HealthConfig::default(),
                ..ServerConfig::default()
            },
            google: GoogleConfig {
                api_key: Some(SecretString::from("test-key")),
                endpoints: GoogleEndpoints {
                    text_to_speech: Some(base_url.to_owned()),
                    speech: Some(base_url.to_owned()),
                    translate: Some(base_url.to_owned()),
                    storage: Some(base_url.to_owned()),
                },
                ..GoogleConfig::default()
            },
            ..Config::default()
        };

        config.tts.long_audio.poll_interval = Duration::from_millis(10);
        config.tts.long_audio.max_wait = Duration::from_secs(5);
        config.subtitles.poll_interval = Duration::from_millis(10);
        config.subtitles.max_wait = Duration::from_secs(5);

        Self { config }
    }

    /// Enable the long-audio tier
    pub fn with_long_audio(mut self, project_id: &str, bucket: &str) -> Self {
        self.config.google.project_id = Some(project_id.to_owned());
        self.config.google.storage_bucket = Some(bucket.to_owned());
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config.validate().expect("test config is valid");
        self.config
    }
}
