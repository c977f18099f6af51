use polyvox_config::{Config, SubtitleFormat, SubtitlesConfig};
use polyvox_core::{CancellationToken, GoogleCredentials};
use polyvox_telemetry::{KeyValue, metrics};

use crate::{
    cues,
    error::SubtitleError,
    provider::{
        RecognitionRequest, Transcriber, Translator, google_speech::GoogleSpeech, google_translate::GoogleTranslate,
        recognition_model,
    },
    types::{RenderPayload, RenderResponse, SubtitlePayload, SubtitleResponse},
};

/// Caption server: recognition, translation, and cue rendering
pub struct Server {
    transcriber: Box<dyn Transcriber>,
    translator: Box<dyn Translator>,
    config: SubtitlesConfig,
    shutdown: CancellationToken,
}

impl Server {
    /// Render captions from words the caller already has
    pub fn render(&self, payload: RenderPayload) -> crate::error::Result<RenderResponse> {
        let words_per_cue = payload.words_per_cue.unwrap_or(self.config.words_per_cue);
        if words_per_cue == 0 {
            return Err(SubtitleError::InvalidRequest("words_per_cue must be at least 1".to_string()));
        }

        if let Some(position) = payload.words.iter().position(|word| !word.is_well_formed()) {
            return Err(SubtitleError::InvalidRequest(format!(
                "word {position} needs 0 <= start <= end"
            )));
        }

        let format = payload.format.unwrap_or(self.config.default_format);
        let timing = payload.timing.unwrap_or(self.config.timing);

        let cues = cues::cues(&payload.words, &payload.translated_text, words_per_cue, timing);
        let subtitles = cues::render(&cues, format);

        record_render(format, "render");

        Ok(RenderResponse {
            subtitles,
            format: format.as_str().to_string(),
            cue_count: cues.len(),
        })
    }

    /// Recognize the audio at `audio_uri`, translate it, and caption it
    pub async fn generate(&self, payload: SubtitlePayload) -> crate::error::Result<SubtitleResponse> {
        if !payload.audio_uri.starts_with("gs://") {
            return Err(SubtitleError::InvalidRequest(
                "audio_uri must be a gs:// Cloud Storage URI".to_string(),
            ));
        }

        let source_lang = payload
            .source_lang
            .filter(|lang| !lang.trim().is_empty())
            .unwrap_or_else(|| self.config.default_source_lang.clone());
        let target_lang = payload
            .target_lang
            .filter(|lang| !lang.trim().is_empty())
            .unwrap_or_else(|| self.config.default_target_lang.clone());
        let format = payload.format.unwrap_or(self.config.default_format);
        let model = recognition_model(&source_lang);

        tracing::info!(
            "Generating {} captions for {} ({source_lang} -> {target_lang}, model {model})",
            format.as_str(),
            payload.audio_uri
        );

        let request = RecognitionRequest {
            audio_uri: &payload.audio_uri,
            language_code: &source_lang,
            model,
            sample_rate_hertz: self.config.sample_rate_hertz,
        };

        let cancel = self.shutdown.child_token();
        let transcript = self.transcriber.transcribe(&request, &cancel).await?;

        if transcript.text.is_empty() {
            return Err(SubtitleError::NoSpeech);
        }

        let translated_text = self
            .translator
            .translate(&transcript.text, &source_lang, &target_lang)
            .await?;

        let cues = cues::cues(&transcript.words, &translated_text, self.config.words_per_cue, self.config.timing);
        let subtitles = cues::render(&cues, format);

        tracing::debug!("Rendered {} cues", cues.len());

        record_render(format, "pipeline");

        Ok(SubtitleResponse {
            subtitles,
            original_text: transcript.text,
            translated_text,
            format: format.as_str().to_string(),
            source_lang,
            target_lang,
            model_used: model.to_string(),
        })
    }
}

fn record_render(format: SubtitleFormat, source: &'static str) {
    metrics::counter(metrics::SUBTITLES_RENDER_COUNT).add(
        1,
        &[KeyValue::new("format", format.as_str()), KeyValue::new("source", source)],
    );
}

/// Builder for constructing the caption server from configuration
pub struct SubtitlesServerBuilder<'a> {
    config: &'a Config,
    shutdown: CancellationToken,
    transcriber: Option<Box<dyn Transcriber>>,
    translator: Option<Box<dyn Translator>>,
}

impl<'a> SubtitlesServerBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
            transcriber: None,
            translator: None,
        }
    }

    /// Token whose cancellation aborts in-flight recognition waits
    #[must_use]
    pub fn shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    #[must_use]
    pub fn transcriber(mut self, transcriber: Box<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    #[must_use]
    pub fn translator(mut self, translator: Box<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn build(self) -> crate::error::Result<Server> {
        let google = &self.config.google;
        let credentials = || {
            GoogleCredentials::resolve(google.api_key.as_ref(), google.access_token.as_ref()).ok_or_else(|| {
                SubtitleError::ConfigMissing("google.api_key or google.access_token is required".to_string())
            })
        };

        let transcriber = match self.transcriber {
            Some(transcriber) => transcriber,
            None => Box::new(GoogleSpeech::new(credentials()?, google, &self.config.subtitles)),
        };

        let translator = match self.translator {
            Some(translator) => translator,
            None => Box::new(GoogleTranslate::new(credentials()?, google)),
        };

        Ok(Server {
            transcriber,
            translator,
            config: self.config.subtitles.clone(),
            shutdown: self.shutdown,
        })
    }
}
