use std::path::PathBuf;

use polyvox_config::{AudioFormat, TtsConfig};
use serde::Deserialize;

/// Speech synthesis request body
#[derive(Debug, Deserialize)]
pub struct SpeechPayload {
    /// Text to synthesize
    pub input: String,
    /// BCP-47 language of the voice (e.g. "es-ES")
    pub language_code: Option<String>,
    /// Google voice name (e.g. "es-ES-Standard-A")
    pub voice: Option<String>,
    /// Delivery style; unknown names are treated as no style
    pub style: Option<String>,
    /// Output container (mp3, wav, ogg, flac)
    pub response_format: Option<AudioFormat>,
    pub speaking_rate: Option<f64>,
    pub pitch: Option<f64>,
    pub volume_gain_db: Option<f64>,
    /// Audio effects profile id, long-audio tier only
    pub effects_profile: Option<String>,
}

impl SpeechPayload {
    /// Fill missing voice parameters from the configured defaults
    pub fn into_request(self, config: &TtsConfig) -> SynthesisRequest {
        let style = self.style.as_deref().and_then(|name| {
            let parsed = SpeakingStyle::parse(name);
            if parsed.is_none() {
                tracing::debug!("Ignoring unknown speaking style '{name}'");
            }
            parsed
        });

        SynthesisRequest {
            text: self.input,
            language_code: self
                .language_code
                .unwrap_or_else(|| config.default_voice_language.clone()),
            voice_name: self.voice.unwrap_or_else(|| config.default_voice_name.clone()),
            style,
            format: self.response_format.unwrap_or(config.default_audio_format),
            speaking_rate: self.speaking_rate.unwrap_or(config.default_speaking_rate),
            pitch: self.pitch.unwrap_or(config.default_pitch),
            volume_gain_db: self.volume_gain_db.unwrap_or(config.default_volume_gain_db),
            effects_profile: self.effects_profile,
        }
    }
}

/// A fully resolved synthesis request
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub language_code: String,
    pub voice_name: String,
    pub style: Option<SpeakingStyle>,
    pub format: AudioFormat,
    pub speaking_rate: f64,
    pub pitch: f64,
    pub volume_gain_db: f64,
    pub effects_profile: Option<String>,
}

/// Named delivery styles rendered as speech markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakingStyle {
    Conversational,
    Narrative,
    News,
    Presenter,
    Storytelling,
    Enthusiastic,
    Calm,
    Advertising,
}

impl SpeakingStyle {
    pub fn parse(name: &str) -> Option<Self> {
        let style = match name.trim().to_ascii_lowercase().as_str() {
            "conversational" => Self::Conversational,
            "narrative" => Self::Narrative,
            "news" => Self::News,
            "presenter" => Self::Presenter,
            "storytelling" => Self::Storytelling,
            "enthusiastic" => Self::Enthusiastic,
            "calm" => Self::Calm,
            "advertising" => Self::Advertising,
            _ => return None,
        };

        Some(style)
    }
}

/// Which tier produced the audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisMethod {
    Standard,
    LongAudio,
    Chunked,
}

impl SynthesisMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::LongAudio => "long_audio",
            Self::Chunked => "chunked",
        }
    }
}

/// Synthesized audio and how it was made
#[derive(Debug)]
pub struct SynthesisResult {
    pub audio: Vec<u8>,
    pub method: SynthesisMethod,
    /// Number of chunks synthesized, chunked tier only
    pub chunk_count: Option<usize>,
    /// Container of `audio`, which may differ from the requested one
    pub format: AudioFormat,
}

impl SynthesisResult {
    /// Convert the result into an axum HTTP response
    pub fn into_response(self) -> axum::response::Response {
        let mut builder = axum::response::Response::builder()
            .header(http::header::CONTENT_TYPE, self.format.content_type())
            .header("x-synthesis-method", self.method.as_str());

        if let Some(chunks) = self.chunk_count {
            builder = builder.header("x-synthesis-chunks", chunks);
        }

        builder.body(axum::body::Body::from(self.audio)).unwrap_or_else(|_| {
            let mut response = axum::response::Response::new(axum::body::Body::empty());
            *response.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
    }
}

/// One synthesized chunk, stored on disk until the join
#[derive(Debug)]
pub struct AudioChunk {
    pub sequence_index: usize,
    pub source_text: String,
    pub path: PathBuf,
}
