pub(crate) mod google_speech;
pub(crate) mod google_translate;

use async_trait::async_trait;
use http::StatusCode;
use polyvox_core::{CancellationToken, GoogleApiError};

use crate::{error::SubtitleError, types::Transcript};

/// Recognition models that handle these languages better on short utterances
const SHORT_MODEL_LANGUAGES: [&str; 6] = ["ja-JP", "ko-KR", "zh-CN", "zh-TW", "th-TH", "vi-VN"];

/// Recognition model for `language_code`
pub fn recognition_model(language_code: &str) -> &'static str {
    if SHORT_MODEL_LANGUAGES
        .iter()
        .any(|language| language.eq_ignore_ascii_case(language_code))
    {
        "latest_short"
    } else {
        "latest_long"
    }
}

/// What to recognize and how
#[derive(Debug, Clone, Copy)]
pub struct RecognitionRequest<'a> {
    /// `gs://` URI of LINEAR16 audio
    pub audio_uri: &'a str,
    pub language_code: &'a str,
    pub model: &'a str,
    pub sample_rate_hertz: u32,
}

/// Speech recognition with word offsets
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Recognize the audio and return its words in order
    ///
    /// An empty result set is reported as [`SubtitleError::NoSpeech`].
    async fn transcribe(
        &self,
        request: &RecognitionRequest<'_>,
        cancel: &CancellationToken,
    ) -> crate::error::Result<Transcript>;
}

/// Text translation
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> crate::error::Result<String>;
}

/// Map a failed Google call onto a subtitle error
pub(crate) fn classify(service: &str, status: StatusCode, body: &str) -> SubtitleError {
    let api_error = GoogleApiError::parse(body);
    let google_status = api_error.as_ref().map_or("", |e| e.status.as_str());
    let message = api_error
        .as_ref()
        .map_or_else(|| body.to_string(), |e| format!("{service}: {}", e.message));

    match (status.as_u16(), google_status) {
        (429, _) | (_, "RESOURCE_EXHAUSTED") => SubtitleError::QuotaExceeded(message),
        (401 | 403, _) | (_, "UNAUTHENTICATED" | "PERMISSION_DENIED") => SubtitleError::AuthenticationFailed(message),
        (400, _) | (_, "INVALID_ARGUMENT") => SubtitleError::InvalidRequest(message),
        (500..=599, _) | (_, "UNAVAILABLE" | "DEADLINE_EXCEEDED" | "INTERNAL") => {
            SubtitleError::ServiceUnavailable(message)
        }
        (code, _) => SubtitleError::ProviderApiError { status: code, message },
    }
}
