#![allow(clippy::must_use_candidate)]

mod duration;
mod env;
pub mod google;
mod loader;
pub mod server;
pub mod subtitles;
pub mod telemetry;
pub mod tts;

use serde::Deserialize;

pub use google::*;
pub use server::*;
pub use subtitles::*;
pub use telemetry::{ExportProtocol, ExporterConfig, TelemetryConfig};
pub use tts::*;

/// Top-level Polyvox configuration
///
/// Loaded once at startup and shared read-only by every request.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Google Cloud credentials and endpoints
    #[serde(default)]
    pub google: GoogleConfig,
    /// Speech synthesis defaults and tier settings
    #[serde(default)]
    pub tts: TtsConfig,
    /// Caption generation settings
    #[serde(default)]
    pub subtitles: SubtitlesConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
