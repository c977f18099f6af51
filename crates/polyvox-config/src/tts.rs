use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Speech synthesis defaults and tier settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsConfig {
    /// Language used when a request names none
    #[serde(default = "default_voice_language")]
    pub default_voice_language: String,
    /// Voice used when a request names none, and the last-resort fallback voice
    #[serde(default = "default_voice_name")]
    pub default_voice_name: String,
    /// Output container used when a request names none
    #[serde(default)]
    pub default_audio_format: AudioFormat,
    #[serde(default = "default_speaking_rate")]
    pub default_speaking_rate: f64,
    #[serde(default)]
    pub default_pitch: f64,
    #[serde(default)]
    pub default_volume_gain_db: f64,
    /// Largest payload, in bytes, sent to the synchronous API
    #[serde(default = "default_standard_max_bytes")]
    pub standard_max_bytes: usize,
    /// Long-audio tier settings
    #[serde(default)]
    pub long_audio: LongAudioConfig,
    /// Encoder used for MP3, Ogg and FLAC output of decoded audio
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// Parent of per-request scratch directories; the system temp dir when unset
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            default_voice_language: default_voice_language(),
            default_voice_name: default_voice_name(),
            default_audio_format: AudioFormat::default(),
            default_speaking_rate: default_speaking_rate(),
            default_pitch: 0.0,
            default_volume_gain_db: 0.0,
            standard_max_bytes: default_standard_max_bytes(),
            long_audio: LongAudioConfig::default(),
            ffmpeg_path: default_ffmpeg_path(),
            scratch_dir: None,
        }
    }
}

/// Long-audio tier settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LongAudioConfig {
    /// Delay between operation status checks
    #[serde(default = "default_poll_interval", deserialize_with = "crate::duration::deserialize")]
    pub poll_interval: Duration,
    /// Give up on the operation after this long
    #[serde(default = "default_max_wait", deserialize_with = "crate::duration::deserialize")]
    pub max_wait: Duration,
    /// Object prefix for synthesized output inside the bucket
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    /// Effects profile applied when the request carries none
    #[serde(default = "default_effects_profile")]
    pub effects_profile: Option<String>,
}

impl Default for LongAudioConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            max_wait: default_max_wait(),
            output_prefix: default_output_prefix(),
            effects_profile: default_effects_profile(),
        }
    }
}

/// Output audio container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
    Ogg,
    Flac,
}

impl AudioFormat {
    /// File extension and wire name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
        }
    }

    /// MIME type of the container
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
            Self::Flac => "audio/flac",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_voice_language() -> String {
    "es-ES".to_string()
}

fn default_voice_name() -> String {
    "es-ES-Standard-A".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_speaking_rate() -> f64 {
    1.0
}

#[allow(clippy::missing_const_for_fn)]
fn default_standard_max_bytes() -> usize {
    5000
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_output_prefix() -> String {
    "audio/synthesized".to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_effects_profile() -> Option<String> {
    Some("telephony-class-application".to_string())
}

#[allow(clippy::missing_const_for_fn)]
fn default_poll_interval() -> Duration {
    Duration::from_secs(10)
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_wait() -> Duration {
    Duration::from_secs(30 * 60)
}
