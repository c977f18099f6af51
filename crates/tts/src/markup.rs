//! Speech markup for styled delivery
//!
//! A style becomes an SSML envelope: prosody rate and emphasis from a
//! fixed table, plus a short break after every sentence end. Long inputs
//! get shorter pauses for brisk styles and longer pauses for narrated
//! ones.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::SpeakingStyle;

/// Largest markup, in characters, sent for a single chunk
pub const MARKUP_LIMIT: usize = 4500;

/// Total input length at which pauses are retuned
pub const LONG_TEXT_THRESHOLD: usize = 15_000;

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.!?])(\s)").expect("sentence boundary pattern is valid"));

/// Which envelope wraps the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `<speak><prosody><emphasis>`
    Full,
    /// `<speak><prosody>` only
    Minimal,
}

impl SpeakingStyle {
    const fn prosody_rate(self) -> &'static str {
        match self {
            Self::Conversational => "medium",
            Self::Narrative => "95%",
            Self::News => "105%",
            Self::Presenter => "100%",
            Self::Storytelling => "90%",
            Self::Enthusiastic => "110%",
            Self::Calm => "85%",
            Self::Advertising => "108%",
        }
    }

    const fn emphasis(self) -> &'static str {
        match self {
            Self::Conversational | Self::Narrative | Self::Storytelling => "moderate",
            Self::News | Self::Presenter | Self::Enthusiastic | Self::Advertising => "strong",
            Self::Calm => "reduced",
        }
    }
}

/// Render `text` in the full envelope for `style`
///
/// `total_length` is the character length of the whole request, not of
/// `text`, so every chunk of one request gets the same pauses.
pub fn style_to_markup(text: &str, style: Option<SpeakingStyle>, total_length: usize) -> Option<String> {
    Some(render(text, style?, total_length, Envelope::Full))
}

/// Render `text` in the minimal envelope for `style`
pub fn minimal_markup(text: &str, style: Option<SpeakingStyle>, total_length: usize) -> Option<String> {
    Some(render(text, style?, total_length, Envelope::Minimal))
}

/// Render with an explicit envelope
pub fn render(text: &str, style: SpeakingStyle, total_length: usize, envelope: Envelope) -> String {
    let pause = pause_ms(style, total_length);
    let escaped = escape(text);
    let body = SENTENCE_END.replace_all(&escaped, format!("${{1}}<break time=\"{pause}ms\"/>${{2}}").as_str());
    let rate = style.prosody_rate();

    match envelope {
        Envelope::Full => format!(
            "<speak><prosody rate=\"{rate}\"><emphasis level=\"{}\">{body}</emphasis></prosody></speak>",
            style.emphasis()
        ),
        Envelope::Minimal => format!("<speak><prosody rate=\"{rate}\">{body}</prosody></speak>"),
    }
}

const fn pause_ms(style: SpeakingStyle, total_length: usize) -> u32 {
    if total_length < LONG_TEXT_THRESHOLD {
        return 350;
    }

    match style {
        SpeakingStyle::News | SpeakingStyle::Presenter => 250,
        SpeakingStyle::Narrative | SpeakingStyle::Storytelling => 500,
        _ => 350,
    }
}

// `&` must go first so the entities below are not double-escaped
fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
