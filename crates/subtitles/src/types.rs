use polyvox_config::{SubtitleFormat, TimingPolicy};
use serde::{Deserialize, Serialize};

/// A recognized word with its offsets into the audio, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl TimedWord {
    pub fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.end >= self.start
    }
}

/// Body of `POST /v1/subtitles/render`
#[derive(Debug, Deserialize)]
pub struct RenderPayload {
    pub words: Vec<TimedWord>,
    pub translated_text: String,
    #[serde(default)]
    pub format: Option<SubtitleFormat>,
    #[serde(default)]
    pub words_per_cue: Option<usize>,
    #[serde(default)]
    pub timing: Option<TimingPolicy>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenderResponse {
    pub subtitles: String,
    pub format: String,
    pub cue_count: usize,
}

/// Body of `POST /v1/subtitles`
#[derive(Debug, Deserialize)]
pub struct SubtitlePayload {
    /// `gs://` URI of LINEAR16 audio
    pub audio_uri: String,
    #[serde(default)]
    pub source_lang: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
    #[serde(default)]
    pub format: Option<SubtitleFormat>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubtitleResponse {
    pub subtitles: String,
    pub original_text: String,
    pub translated_text: String,
    pub format: String,
    pub source_lang: String,
    pub target_lang: String,
    pub model_used: String,
}

/// Recognition output: the transcript and the words it is made of
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    pub text: String,
    pub words: Vec<TimedWord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_payload_defaults() {
        let payload: RenderPayload = serde_json::from_str(
            r#"{"words":[{"text":"hi","start":0.0,"end":0.4}],"translated_text":"hola"}"#,
        )
        .unwrap();

        assert!(payload.format.is_none());
        assert!(payload.words_per_cue.is_none());
        assert!(payload.timing.is_none());
    }

    #[test]
    fn render_payload_options() {
        let payload: RenderPayload = serde_json::from_str(
            r#"{"words":[],"translated_text":"","format":"vtt","words_per_cue":4,"timing":"proportional"}"#,
        )
        .unwrap();

        assert_eq!(payload.format, Some(SubtitleFormat::Vtt));
        assert_eq!(payload.words_per_cue, Some(4));
        assert_eq!(payload.timing, Some(TimingPolicy::Proportional));
    }

    #[test]
    fn malformed_words() {
        let word = |start, end| TimedWord {
            text: "x".into(),
            start,
            end,
        };

        assert!(word(0.0, 0.0).is_well_formed());
        assert!(!word(-0.1, 1.0).is_well_formed());
        assert!(!word(2.0, 1.0).is_well_formed());
        assert!(!word(f64::NAN, 1.0).is_well_formed());
    }
}
