use std::time::Duration;

use serde::Deserialize;

/// Caption generation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubtitlesConfig {
    /// Recognition language used when a request names none
    #[serde(default = "default_source_lang")]
    pub default_source_lang: String,
    /// Translation target used when a request names none
    #[serde(default = "default_target_lang")]
    pub default_target_lang: String,
    #[serde(default)]
    pub default_format: SubtitleFormat,
    /// Translated words per caption
    #[serde(default = "default_words_per_cue")]
    pub words_per_cue: usize,
    /// How translated words are mapped onto source timestamps
    #[serde(default)]
    pub timing: TimingPolicy,
    /// Sample rate of the LINEAR16 audio handed to recognition
    #[serde(default = "default_sample_rate_hertz")]
    pub sample_rate_hertz: u32,
    /// Delay between recognition status checks
    #[serde(default = "default_poll_interval", deserialize_with = "crate::duration::deserialize")]
    pub poll_interval: Duration,
    /// Give up on recognition after this long
    #[serde(default = "default_max_wait", deserialize_with = "crate::duration::deserialize")]
    pub max_wait: Duration,
}

impl Default for SubtitlesConfig {
    fn default() -> Self {
        Self {
            default_source_lang: default_source_lang(),
            default_target_lang: default_target_lang(),
            default_format: SubtitleFormat::default(),
            words_per_cue: default_words_per_cue(),
            timing: TimingPolicy::default(),
            sample_rate_hertz: default_sample_rate_hertz(),
            poll_interval: default_poll_interval(),
            max_wait: default_max_wait(),
        }
    }
}

/// Caption file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Vtt,
}

impl SubtitleFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }
}

/// Mapping of translated words onto source-audio timestamps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingPolicy {
    /// Translated word `i` takes the timestamp of source word `i`;
    /// groups past the end of the source words are dropped
    #[default]
    IndexAligned,
    /// The source span is spread evenly over the translated words
    Proportional,
}

fn default_source_lang() -> String {
    "en-US".to_string()
}

fn default_target_lang() -> String {
    "es".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_words_per_cue() -> usize {
    8
}

#[allow(clippy::missing_const_for_fn)]
fn default_sample_rate_hertz() -> u32 {
    16_000
}

#[allow(clippy::missing_const_for_fn)]
fn default_poll_interval() -> Duration {
    Duration::from_secs(10)
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_wait() -> Duration {
    Duration::from_secs(60 * 60)
}
