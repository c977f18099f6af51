//! Grouping translated text into timed captions
//!
//! Google returns timestamps for the words it recognized, but the
//! captions carry translated words, and translation changes the word
//! count. Two policies map one onto the other:
//!
//! * [`TimingPolicy::IndexAligned`] gives translated word `i` the
//!   timestamps of recognized word `i`. A group starting past the last
//!   recognized word has no timestamp and is dropped.
//! * [`TimingPolicy::Proportional`] spreads the recognized span evenly
//!   over the translated words, so nothing is dropped.

use polyvox_config::{SubtitleFormat, TimingPolicy};

use crate::{timecode, types::TimedWord};

/// One caption, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionCue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Group `translated_text` into cues of `group_size` words
pub fn cues(words: &[TimedWord], translated_text: &str, group_size: usize, policy: TimingPolicy) -> Vec<CaptionCue> {
    let tokens: Vec<&str> = translated_text.split_whitespace().collect();
    let group_size = group_size.max(1);

    let (Some(first), Some(last)) = (words.first(), words.last()) else {
        return Vec::new();
    };

    let mut cues = Vec::with_capacity(tokens.len().div_ceil(group_size));

    for (group, chunk) in tokens.chunks(group_size).enumerate() {
        let position = group * group_size;
        let text = chunk.join(" ");

        match policy {
            TimingPolicy::IndexAligned => {
                // The end index is capped by the recognized words, not the group
                let Some(start) = words.get(position) else {
                    tracing::debug!(
                        "Dropping {} caption group(s) past recognized word {}",
                        tokens.chunks(group_size).count() - group,
                        words.len() - 1
                    );
                    break;
                };
                let end = &words[(position + group_size - 1).min(words.len() - 1)];

                cues.push(CaptionCue {
                    start: start.start,
                    end: end.end,
                    text,
                });
            }
            TimingPolicy::Proportional => {
                let per_word = (last.end - first.start) / count_as_f64(tokens.len());

                cues.push(CaptionCue {
                    start: first.start + per_word * count_as_f64(position),
                    end: first.start + per_word * count_as_f64(position + chunk.len()),
                    text,
                });
            }
        }
    }

    cues
}

#[allow(clippy::cast_precision_loss)]
fn count_as_f64(count: usize) -> f64 {
    count as f64
}

/// Serialize cues as an SRT or WebVTT document
pub fn render(cues: &[CaptionCue], format: SubtitleFormat) -> String {
    let mut blocks = Vec::with_capacity(cues.len() + 1);

    if format == SubtitleFormat::Vtt {
        blocks.push("WEBVTT\n".to_string());
    }

    for (index, cue) in cues.iter().enumerate() {
        let timing = format!(
            "{} --> {}",
            timecode::format(cue.start, format),
            timecode::format(cue.end, format)
        );

        blocks.push(match format {
            SubtitleFormat::Srt => format!("{}\n{timing}\n{}\n", index + 1, cue.text),
            SubtitleFormat::Vtt => format!("{timing}\n{}\n", cue.text),
        });
    }

    blocks.join("\n")
}

/// Index-aligned captions for `translated_text`, rendered in `format`
pub fn bucketize(words: &[TimedWord], translated_text: &str, group_size: usize, format: SubtitleFormat) -> String {
    render(
        &cues(words, translated_text, group_size, TimingPolicy::IndexAligned),
        format,
    )
}
