pub mod google;
pub mod storage;

use async_trait::async_trait;
use polyvox_config::AudioFormat;
use polyvox_core::CancellationToken;

/// What the service reads: plain text or speech markup
#[derive(Debug, Clone, Copy)]
pub enum SynthesisInput<'a> {
    Text(&'a str),
    Markup(&'a str),
}

impl SynthesisInput<'_> {
    pub const fn is_markup(&self) -> bool {
        matches!(self, Self::Markup(_))
    }
}

/// Audio encoding requested from the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    Mp3,
    Linear16,
    OggOpus,
}

impl AudioEncoding {
    /// The service has no FLAC output; FLAC is exported from LINEAR16
    pub const fn for_format(format: AudioFormat) -> Self {
        match format {
            AudioFormat::Mp3 => Self::Mp3,
            AudioFormat::Wav | AudioFormat::Flac => Self::Linear16,
            AudioFormat::Ogg => Self::OggOpus,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Linear16 => "LINEAR16",
            Self::OggOpus => "OGG_OPUS",
        }
    }
}

/// A single call to the synthesis service
#[derive(Debug, Clone, Copy)]
pub struct SynthesisCall<'a> {
    pub input: SynthesisInput<'a>,
    pub language_code: &'a str,
    pub voice_name: &'a str,
    pub encoding: AudioEncoding,
    pub speaking_rate: f64,
    pub pitch: f64,
    pub volume_gain_db: f64,
    pub effects_profile: Option<&'a str>,
}

/// Seam between the tier logic and the speech service
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synchronous synthesis of a bounded input
    async fn synthesize(&self, call: &SynthesisCall<'_>) -> crate::error::Result<Vec<u8>>;

    /// Long-running synthesis, always LINEAR16 WAV
    ///
    /// Waits for the operation until it completes, times out, or `cancel`
    /// fires.
    async fn synthesize_long(
        &self,
        call: &SynthesisCall<'_>,
        cancel: &CancellationToken,
    ) -> crate::error::Result<Vec<u8>>;
}
