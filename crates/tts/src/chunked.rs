//! Terminal fallback: synthesize the text piece by piece
//!
//! The text is cut into bounded character chunks. Each chunk is rendered
//! in the requested style, shrunk until its markup fits, synthesized
//! through a short ladder of progressively safer attempts, and written to
//! a per-request scratch directory as LINEAR16. The pieces are joined and
//! encoded once every chunk has succeeded.

use std::collections::VecDeque;

use polyvox_config::TtsConfig;
use polyvox_core::CancellationToken;

use crate::{
    audio,
    error::{FailureKind, TtsError},
    markup::{self, Envelope, LONG_TEXT_THRESHOLD, MARKUP_LIMIT},
    provider::{AudioEncoding, SpeechSynthesizer, SynthesisCall, SynthesisInput},
    types::{AudioChunk, SpeakingStyle, SynthesisMethod, SynthesisRequest, SynthesisResult},
    voices,
};

pub const DEFAULT_CHUNK_SIZE: usize = 4000;
pub const STYLED_CHUNK_SIZE: usize = 3500;
pub const LONG_TEXT_CHUNK_SIZE: usize = 3200;

/// Shrinking stops once a chunk is shorter than this many characters
pub const MARKUP_FLOOR: usize = 500;

/// Characters per chunk; the smallest applicable size wins
pub const fn chunk_size(style: Option<SpeakingStyle>, total_length: usize) -> usize {
    if total_length >= LONG_TEXT_THRESHOLD {
        LONG_TEXT_CHUNK_SIZE
    } else if style.is_some() {
        STYLED_CHUNK_SIZE
    } else {
        DEFAULT_CHUNK_SIZE
    }
}

/// Cut `text` into contiguous pieces of at most `size` characters
pub fn split_chunks(text: &str, size: usize) -> VecDeque<String> {
    let mut chunks = VecDeque::new();
    let mut current = String::new();
    let mut count = 0;

    for c in text.chars() {
        current.push(c);
        count += 1;
        if count == size {
            chunks.push_back(std::mem::take(&mut current));
            count = 0;
        }
    }

    if !current.is_empty() {
        chunks.push_back(current);
    }

    chunks
}

/// How much markup a chunk is sent with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupLevel {
    Full,
    Minimal,
    Plain,
}

impl MarkupLevel {
    const fn downgrade(self) -> Option<Self> {
        match self {
            Self::Full => Some(Self::Minimal),
            Self::Minimal => Some(Self::Plain),
            Self::Plain => None,
        }
    }
}

/// A chunk trimmed so its markup fits, plus the text cut off its end
#[derive(Debug)]
struct FittedChunk {
    spoken: String,
    carry: String,
    level: MarkupLevel,
}

fn fit_markup(source: String, style: Option<SpeakingStyle>, total_length: usize) -> FittedChunk {
    let Some(style) = style else {
        return FittedChunk {
            spoken: source,
            carry: String::new(),
            level: MarkupLevel::Plain,
        };
    };

    let mut kept = source.chars().count();
    let level = loop {
        let candidate = char_prefix(&source, kept);
        let full = markup::render(candidate, style, total_length, Envelope::Full);
        if full.chars().count() <= MARKUP_LIMIT {
            break MarkupLevel::Full;
        }
        if kept < MARKUP_FLOOR {
            break MarkupLevel::Minimal;
        }
        kept = kept * 9 / 10;
    };

    let split_at = char_prefix(&source, kept).len();
    let mut spoken = source;
    let carry = spoken.split_off(split_at);

    if !carry.is_empty() {
        tracing::debug!(
            "Chunk markup too long, carrying {} characters forward",
            carry.chars().count()
        );
    }

    FittedChunk { spoken, carry, level }
}

fn char_prefix(text: &str, chars: usize) -> &str {
    text.char_indices().nth(chars).map_or(text, |(idx, _)| &text[..idx])
}

/// One rung of the per-chunk retry ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub fallback_voice: bool,
    pub markup: MarkupLevel,
}

impl Attempt {
    const fn first(markup: MarkupLevel) -> Self {
        Self {
            fallback_voice: false,
            markup,
        }
    }

    /// The next, more conservative attempt after a failure of `kind`
    ///
    /// `None` means the failure is fatal for the whole request.
    pub const fn next(self, kind: FailureKind, fallback_available: bool) -> Option<Self> {
        match kind {
            FailureKind::VoiceNotFound if !self.fallback_voice && fallback_available => Some(Self {
                fallback_voice: true,
                markup: self.markup,
            }),
            FailureKind::InvalidMarkup => match self.markup.downgrade() {
                Some(markup) => Some(Self {
                    fallback_voice: self.fallback_voice,
                    markup,
                }),
                None => None,
            },
            _ => None,
        }
    }
}

/// Synthesize `request` chunk by chunk
///
/// Any chunk failure that the ladder cannot absorb fails the whole
/// request; no partial audio is returned.
pub async fn synthesize_chunked(
    synthesizer: &dyn SpeechSynthesizer,
    request: &SynthesisRequest,
    config: &TtsConfig,
    cancel: &CancellationToken,
) -> crate::error::Result<SynthesisResult> {
    let total_length = request.text.chars().count();
    let size = chunk_size(request.style, total_length);
    let mut pending = split_chunks(&request.text, size);

    tracing::info!(
        "Chunked synthesis: {} characters in {} chunks of up to {size}",
        total_length,
        pending.len()
    );

    let workdir = audio::scratch_dir("polyvox-chunks-", config.scratch_dir.as_deref())?;

    let fallback_voice = voices::fallback_voice(&request.language_code, &config.default_voice_name);
    let mut chunks = Vec::with_capacity(pending.len());

    while let Some(source) = pending.pop_front() {
        if cancel.is_cancelled() {
            return Err(TtsError::Cancelled);
        }

        let fitted = fit_markup(source, request.style, total_length);
        if !fitted.carry.is_empty() {
            match pending.front_mut() {
                Some(next) => next.insert_str(0, &fitted.carry),
                None => pending.push_front(fitted.carry.clone()),
            }
        }

        let index = chunks.len();
        tracing::debug!("Synthesizing chunk {} ({} characters)", index + 1, fitted.spoken.chars().count());

        let audio = synthesize_chunk(synthesizer, request, &fitted, total_length, fallback_voice)
            .await
            .inspect_err(|e| tracing::error!("Chunk {} failed, abandoning request: {e}", index + 1))?;

        let path = workdir.path().join(format!("chunk-{index:05}"));
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|e| TtsError::AudioError(format!("failed to store chunk {index}: {e}")))?;

        chunks.push(AudioChunk {
            sequence_index: index,
            source_text: fitted.spoken,
            path,
        });
    }

    let audio = audio::join(&mut chunks, request.format, &config.ffmpeg_path, workdir.path()).await?;

    tracing::info!("Chunked synthesis complete: {} chunks, {} bytes", chunks.len(), audio.len());

    Ok(SynthesisResult {
        audio,
        method: SynthesisMethod::Chunked,
        chunk_count: Some(chunks.len()),
        format: request.format,
    })
}

async fn synthesize_chunk(
    synthesizer: &dyn SpeechSynthesizer,
    request: &SynthesisRequest,
    fitted: &FittedChunk,
    total_length: usize,
    fallback_voice: &str,
) -> crate::error::Result<Vec<u8>> {
    let fallback_available = fallback_voice != request.voice_name;
    let mut attempt = Attempt::first(fitted.level);

    loop {
        let rendered = match (attempt.markup, request.style) {
            (MarkupLevel::Full, style) => markup::style_to_markup(&fitted.spoken, style, total_length),
            (MarkupLevel::Minimal, style) => markup::minimal_markup(&fitted.spoken, style, total_length),
            (MarkupLevel::Plain, _) => None,
        };

        let call = SynthesisCall {
            input: rendered
                .as_deref()
                .map_or(SynthesisInput::Text(&fitted.spoken), SynthesisInput::Markup),
            language_code: &request.language_code,
            voice_name: if attempt.fallback_voice {
                fallback_voice
            } else {
                &request.voice_name
            },
            encoding: AudioEncoding::Linear16,
            speaking_rate: request.speaking_rate,
            pitch: request.pitch,
            volume_gain_db: request.volume_gain_db,
            effects_profile: request.effects_profile.as_deref(),
        };

        let error = match synthesizer.synthesize(&call).await {
            Ok(audio) => return Ok(audio),
            Err(error) => error,
        };

        let Some(next) = attempt.next(error.kind(), fallback_available) else {
            return Err(error);
        };

        tracing::warn!(
            "Chunk attempt failed ({}), retrying with fallback_voice={} markup={:?}",
            error.kind().as_str(),
            next.fallback_voice,
            next.markup
        );
        attempt = next;
    }
}
