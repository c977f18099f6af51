use async_trait::async_trait;
use polyvox_config::{GoogleConfig, SubtitlesConfig};
use polyvox_core::{CancellationToken, GoogleApiError, GoogleCredentials, PollOutcome, PollSchedule, WaitError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{RecognitionRequest, Transcriber, classify};
use crate::{
    error::SubtitleError,
    http_client::http_client,
    types::{TimedWord, Transcript},
};

const DEFAULT_SPEECH_API_URL: &str = "https://speech.googleapis.com";

/// Google Cloud Speech-to-Text long-running recognition over REST
pub(crate) struct GoogleSpeech {
    client: Client,
    base_url: String,
    credentials: GoogleCredentials,
    schedule: PollSchedule,
}

impl GoogleSpeech {
    pub fn new(credentials: GoogleCredentials, google: &GoogleConfig, subtitles: &SubtitlesConfig) -> Self {
        Self {
            client: http_client(),
            base_url: google
                .endpoints
                .speech
                .clone()
                .unwrap_or_else(|| DEFAULT_SPEECH_API_URL.to_string()),
            credentials,
            schedule: PollSchedule::new(subtitles.poll_interval, subtitles.max_wait),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> crate::error::Result<Operation> {
        let (header, value) = self
            .credentials
            .header()
            .map_err(|e| SubtitleError::ConfigMissing(format!("unusable Google credential: {e}")))?;

        let response = request.header(header, value).send().await.map_err(|e| {
            tracing::error!("Speech-to-Text request failed: {e}");
            SubtitleError::ConnectionError(format!("Failed to send request to Speech-to-Text: {e}"))
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Speech-to-Text API error ({status}): {error_text}");
            return Err(classify("Speech-to-Text", status, &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| SubtitleError::InternalError(Some(format!("Malformed recognition operation: {e}"))))
    }

    async fn check_operation(&self, name: &str) -> crate::error::Result<PollOutcome<RecognizeResponse>> {
        let operation = self
            .send(self.client.get(format!("{}/v1/operations/{name}", self.base_url)))
            .await?;

        operation.outcome()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeBody<'a> {
    config: RecognitionConfigBody<'a>,
    audio: AudioBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfigBody<'a> {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: &'a str,
    model: &'a str,
    enable_automatic_punctuation: bool,
    enable_word_time_offsets: bool,
}

#[derive(Serialize)]
struct AudioBody<'a> {
    uri: &'a str,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<GoogleApiError>,
    response: Option<RecognizeResponse>,
}

impl Operation {
    fn outcome(self) -> crate::error::Result<PollOutcome<RecognizeResponse>> {
        if !self.done {
            return Ok(PollOutcome::Pending);
        }

        if let Some(error) = self.error {
            tracing::error!("Recognition operation {} failed: {}", self.name, error.message);
            return Err(SubtitleError::OperationFailed(error.message));
        }

        Ok(PollOutcome::Done(self.response.unwrap_or_default()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    words: Vec<WordInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordInfo {
    word: String,
    // Zero offsets are omitted from the JSON
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
}

impl RecognizeResponse {
    /// Concatenate the top alternative of every result
    fn into_transcript(self) -> crate::error::Result<Transcript> {
        if self.results.is_empty() {
            return Err(SubtitleError::NoSpeech);
        }

        let mut text = String::new();
        let mut words = Vec::new();

        for alternative in self.results.into_iter().filter_map(|r| r.alternatives.into_iter().next()) {
            text.push_str(&alternative.transcript);
            text.push(' ');

            for word in alternative.words {
                words.push(TimedWord {
                    start: parse_offset(word.start_time.as_deref())?,
                    end: parse_offset(word.end_time.as_deref())?,
                    text: word.word,
                });
            }
        }

        Ok(Transcript {
            text: text.trim().to_string(),
            words,
        })
    }
}

/// Parse a protobuf JSON duration such as `"1.500s"`
fn parse_offset(offset: Option<&str>) -> crate::error::Result<f64> {
    let Some(offset) = offset else {
        return Ok(0.0);
    };

    offset
        .strip_suffix('s')
        .and_then(|seconds| seconds.parse::<f64>().ok())
        .ok_or_else(|| SubtitleError::InternalError(Some(format!("Malformed word offset '{offset}'"))))
}

#[async_trait]
impl Transcriber for GoogleSpeech {
    async fn transcribe(
        &self,
        request: &RecognitionRequest<'_>,
        cancel: &CancellationToken,
    ) -> crate::error::Result<Transcript> {
        let url = format!("{}/v1/speech:longrunningrecognize", self.base_url);

        tracing::debug!(
            "Speech-to-Text request: uri={}, language={}, model={}",
            request.audio_uri,
            request.language_code,
            request.model
        );

        let body = RecognizeBody {
            config: RecognitionConfigBody {
                encoding: "LINEAR16",
                sample_rate_hertz: request.sample_rate_hertz,
                language_code: request.language_code,
                model: request.model,
                enable_automatic_punctuation: true,
                enable_word_time_offsets: true,
            },
            audio: AudioBody { uri: request.audio_uri },
        };

        let operation = self.send(self.client.post(&url).json(&body)).await?;
        let name = operation.name.clone();

        tracing::info!("Recognition operation {name} started");

        let response = match operation.outcome()? {
            PollOutcome::Done(response) => response,
            PollOutcome::Pending => polyvox_core::wait_for(self.schedule, cancel, || self.check_operation(&name))
                .await
                .map_err(|e| match e {
                    WaitError::TimedOut(waited) => SubtitleError::OperationTimedOut(waited),
                    WaitError::Cancelled => SubtitleError::Cancelled,
                    WaitError::Poll(e) => e,
                })?,
        };

        let transcript = response.into_transcript()?;

        tracing::debug!(
            "Recognition complete: {} characters, {} words",
            transcript.text.len(),
            transcript.words.len()
        );

        Ok(transcript)
    }
}
