//! Tier selection and the fallback cascade
//!
//! Short inputs go to the synchronous API, long plain inputs to the
//! long-audio API, and long styled inputs straight to chunking. When the
//! first tier fails with a cascading failure kind the request is retried
//! by the chunked tier, which is terminal.

use polyvox_config::{AudioFormat, TtsConfig};
use polyvox_core::CancellationToken;
use polyvox_telemetry::{KeyValue, metrics};

use crate::{
    audio, chunked, markup,
    provider::{AudioEncoding, SpeechSynthesizer, SynthesisCall, SynthesisInput},
    types::{SynthesisMethod, SynthesisRequest, SynthesisResult},
};

/// Synthesis strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Standard,
    LongAudio,
    Chunked,
}

impl Tier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::LongAudio => "long_audio",
            Self::Chunked => "chunked",
        }
    }
}

/// First tier for `request`; the limit is in UTF-8 bytes
pub fn entry_tier(request: &SynthesisRequest, standard_max_bytes: usize) -> Tier {
    if request.text.len() <= standard_max_bytes {
        Tier::Standard
    } else if request.style.is_some() {
        Tier::Chunked
    } else {
        Tier::LongAudio
    }
}

/// Run `request` through the cascade
pub async fn synthesize(
    synthesizer: &dyn SpeechSynthesizer,
    config: &TtsConfig,
    request: &SynthesisRequest,
    cancel: &CancellationToken,
) -> crate::error::Result<SynthesisResult> {
    let tier = entry_tier(request, config.standard_max_bytes);

    tracing::info!(
        "Synthesizing {} bytes with voice {} via {} tier",
        request.text.len(),
        request.voice_name,
        tier.as_str()
    );

    let attempt = match tier {
        Tier::Standard => standard(synthesizer, config, request).await,
        Tier::LongAudio => long_audio(synthesizer, request, cancel).await,
        Tier::Chunked => {
            return chunked::synthesize_chunked(synthesizer, request, config, cancel).await;
        }
    };

    match attempt {
        Ok(result) => Ok(result),
        Err(error) if error.kind().cascades() => {
            tracing::warn!(
                "{} tier failed ({}), falling back to chunked synthesis: {error}",
                tier.as_str(),
                error.kind().as_str()
            );

            metrics::counter(metrics::TTS_FALLBACK_COUNT).add(
                1,
                &[
                    KeyValue::new("from", tier.as_str()),
                    KeyValue::new("to", Tier::Chunked.as_str()),
                ],
            );

            chunked::synthesize_chunked(synthesizer, request, config, cancel).await
        }
        Err(error) => Err(error),
    }
}

async fn standard(
    synthesizer: &dyn SpeechSynthesizer,
    config: &TtsConfig,
    request: &SynthesisRequest,
) -> crate::error::Result<SynthesisResult> {
    let markup = markup::style_to_markup(&request.text, request.style, request.text.chars().count());

    let call = SynthesisCall {
        input: markup
            .as_deref()
            .map_or(SynthesisInput::Text(&request.text), SynthesisInput::Markup),
        language_code: &request.language_code,
        voice_name: &request.voice_name,
        encoding: AudioEncoding::for_format(request.format),
        speaking_rate: request.speaking_rate,
        pitch: request.pitch,
        volume_gain_db: request.volume_gain_db,
        effects_profile: request.effects_profile.as_deref(),
    };

    let mut audio = synthesizer.synthesize(&call).await?;

    if request.format == AudioFormat::Flac {
        let workdir = audio::scratch_dir("polyvox-encode-", config.scratch_dir.as_deref())?;
        audio = audio::encode(audio, AudioFormat::Flac, &config.ffmpeg_path, workdir.path()).await?;
    }

    Ok(SynthesisResult {
        audio,
        method: SynthesisMethod::Standard,
        chunk_count: None,
        format: request.format,
    })
}

async fn long_audio(
    synthesizer: &dyn SpeechSynthesizer,
    request: &SynthesisRequest,
    cancel: &CancellationToken,
) -> crate::error::Result<SynthesisResult> {
    let call = SynthesisCall {
        input: SynthesisInput::Text(&request.text),
        language_code: &request.language_code,
        voice_name: &request.voice_name,
        encoding: AudioEncoding::Linear16,
        speaking_rate: request.speaking_rate,
        pitch: request.pitch,
        volume_gain_db: request.volume_gain_db,
        effects_profile: request.effects_profile.as_deref(),
    };

    let audio = synthesizer.synthesize_long(&call, cancel).await?;

    if request.format != AudioFormat::Wav {
        tracing::debug!("Long-audio output is WAV, requested {} is not applied", request.format);
    }

    Ok(SynthesisResult {
        audio,
        method: SynthesisMethod::LongAudio,
        chunk_count: None,
        format: AudioFormat::Wav,
    })
}
