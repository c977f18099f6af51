use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use http::StatusCode;
use polyvox_config::{GoogleConfig, LongAudioConfig};
use polyvox_core::{CancellationToken, GoogleApiError, GoogleCredentials, PollOutcome, PollSchedule, WaitError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AudioEncoding, SpeechSynthesizer, SynthesisCall, SynthesisInput, storage::StorageClient};
use crate::{error::TtsError, http_client::http_client};

const DEFAULT_TTS_API_URL: &str = "https://texttospeech.googleapis.com";

/// Google Cloud Text-to-Speech over REST
pub(crate) struct GoogleTts {
    client: Client,
    base_url: String,
    credentials: GoogleCredentials,
    project_id: Option<String>,
    bucket: Option<String>,
    location: String,
    long_audio: LongAudioConfig,
    storage: StorageClient,
}

impl GoogleTts {
    pub fn new(credentials: GoogleCredentials, google: &GoogleConfig, long_audio: &LongAudioConfig) -> Self {
        let client = http_client();

        Self {
            storage: StorageClient::new(client.clone(), credentials.clone(), google.endpoints.storage.clone()),
            client,
            base_url: google
                .endpoints
                .text_to_speech
                .clone()
                .unwrap_or_else(|| DEFAULT_TTS_API_URL.to_string()),
            credentials,
            project_id: google.project_id().map(str::to_string),
            bucket: google.storage_bucket().map(str::to_string),
            location: google.location.clone(),
            long_audio: long_audio.clone(),
        }
    }

    async fn post<B: Serialize + Sync>(&self, url: &str, body: &B, markup: bool) -> crate::error::Result<reqwest::Response> {
        let (header, value) = self
            .credentials
            .header()
            .map_err(|e| TtsError::ConfigMissing(format!("unusable Google credential: {e}")))?;

        let response = self
            .client
            .post(url)
            .header(header, value)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Google TTS request failed: {e}");
                TtsError::ConnectionError(format!("Failed to send request to Google TTS: {e}"))
            })?;

        ensure_success(response, markup).await
    }

    async fn check_operation(&self, name: &str) -> crate::error::Result<PollOutcome<()>> {
        let (header, value) = self
            .credentials
            .header()
            .map_err(|e| TtsError::ConfigMissing(format!("unusable Google credential: {e}")))?;

        let response = self
            .client
            .get(format!("{}/v1/{name}", self.base_url))
            .header(header, value)
            .send()
            .await
            .map_err(|e| TtsError::ConnectionError(format!("Failed to poll long-audio operation: {e}")))?;

        let operation: Operation = ensure_success(response, false)
            .await?
            .json()
            .await
            .map_err(|e| TtsError::InternalError(Some(format!("Malformed operation status: {e}"))))?;

        if !operation.done {
            return Ok(PollOutcome::Pending);
        }

        match operation.error {
            Some(error) => {
                tracing::error!("Long-audio operation {name} failed: {}", error.message);
                Err(TtsError::OperationFailed(error.message))
            }
            None => Ok(PollOutcome::Done(())),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: InputBody<'a>,
    voice: VoiceBody<'a>,
    audio_config: AudioConfigBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LongAudioBody<'a> {
    input: InputBody<'a>,
    voice: VoiceBody<'a>,
    audio_config: AudioConfigBody<'a>,
    output_gcs_uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum InputBody<'a> {
    Text(&'a str),
    Ssml(&'a str),
}

impl<'a> From<SynthesisInput<'a>> for InputBody<'a> {
    fn from(input: SynthesisInput<'a>) -> Self {
        match input {
            SynthesisInput::Text(text) => Self::Text(text),
            SynthesisInput::Markup(ssml) => Self::Ssml(ssml),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceBody<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfigBody<'a> {
    audio_encoding: &'static str,
    speaking_rate: f64,
    pitch: f64,
    volume_gain_db: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    effects_profile_id: Vec<&'a str>,
}

impl<'a> AudioConfigBody<'a> {
    fn new(call: &SynthesisCall<'a>, encoding: AudioEncoding, effects_profile: Option<&'a str>) -> Self {
        Self {
            audio_encoding: encoding.as_str(),
            speaking_rate: call.speaking_rate,
            pitch: call.pitch,
            volume_gain_db: call.volume_gain_db,
            effects_profile_id: effects_profile.into_iter().collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<GoogleApiError>,
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, call: &SynthesisCall<'_>) -> crate::error::Result<Vec<u8>> {
        let url = format!("{}/v1/text:synthesize", self.base_url);

        tracing::debug!(
            "Google TTS request: voice={}, encoding={}, markup={}",
            call.voice_name,
            call.encoding.as_str(),
            call.input.is_markup(),
        );

        let body = SynthesizeBody {
            input: call.input.into(),
            voice: VoiceBody {
                language_code: call.language_code,
                name: call.voice_name,
            },
            audio_config: AudioConfigBody::new(call, call.encoding, call.effects_profile),
        };

        let response: SynthesizeResponse = self
            .post(&url, &body, call.input.is_markup())
            .await?
            .json()
            .await
            .map_err(|e| {
                tracing::error!("Failed to read Google TTS response body: {e}");
                TtsError::InternalError(None)
            })?;

        let audio = BASE64
            .decode(response.audio_content)
            .map_err(|e| TtsError::InternalError(Some(format!("Invalid audio content from Google TTS: {e}"))))?;

        tracing::debug!("Google TTS synthesis complete, {} bytes", audio.len());

        Ok(audio)
    }

    async fn synthesize_long(
        &self,
        call: &SynthesisCall<'_>,
        cancel: &CancellationToken,
    ) -> crate::error::Result<Vec<u8>> {
        let project_id = self
            .project_id
            .as_deref()
            .ok_or_else(|| TtsError::ConfigMissing("google.project_id is required for long-audio synthesis".into()))?;
        let bucket = self
            .bucket
            .as_deref()
            .ok_or_else(|| TtsError::ConfigMissing("google.storage_bucket is required for long-audio synthesis".into()))?;

        let object = format!(
            "{}/{}.wav",
            self.long_audio.output_prefix.trim_end_matches('/'),
            uuid::Uuid::new_v4()
        );
        let url = format!(
            "{}/v1/projects/{project_id}/locations/{}:synthesizeLongAudio",
            self.base_url, self.location
        );

        let effects_profile = call.effects_profile.or(self.long_audio.effects_profile.as_deref());
        let body = LongAudioBody {
            input: call.input.into(),
            voice: VoiceBody {
                language_code: call.language_code,
                name: call.voice_name,
            },
            audio_config: AudioConfigBody::new(call, AudioEncoding::Linear16, effects_profile),
            output_gcs_uri: format!("gs://{bucket}/{object}"),
        };

        let operation: Operation = self
            .post(&url, &body, call.input.is_markup())
            .await?
            .json()
            .await
            .map_err(|e| TtsError::InternalError(Some(format!("Malformed long-audio operation: {e}"))))?;

        tracing::info!("Long-audio operation {} started, output gs://{bucket}/{object}", operation.name);

        let schedule = PollSchedule::new(self.long_audio.poll_interval, self.long_audio.max_wait);

        polyvox_core::wait_for(schedule, cancel, || self.check_operation(&operation.name))
            .await
            .map_err(|e| match e {
                WaitError::TimedOut(waited) => TtsError::OperationTimedOut(waited),
                WaitError::Cancelled => TtsError::Cancelled,
                WaitError::Poll(e) => e,
            })?;

        self.storage.download(bucket, &object).await
    }
}

/// Pass successful responses through and classify failures
async fn ensure_success(response: reqwest::Response, markup: bool) -> crate::error::Result<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

    tracing::error!("Google TTS API error ({status}): {error_text}");

    Err(classify(status, &error_text, markup))
}

/// Map a failed call onto an error whose kind drives the fallback
///
/// A rejected argument means the markup when markup was sent, and the
/// voice otherwise; the voice is the only other free-form field.
fn classify(status: StatusCode, body: &str, markup: bool) -> TtsError {
    let api_error = GoogleApiError::parse(body);
    let google_status = api_error.as_ref().map_or("", |e| e.status.as_str());
    let message = api_error
        .as_ref()
        .map_or_else(|| body.to_string(), |e| e.message.clone());

    match (status.as_u16(), google_status) {
        (429, _) | (_, "RESOURCE_EXHAUSTED") => TtsError::QuotaExceeded(message),
        (401 | 403, _) | (_, "UNAUTHENTICATED" | "PERMISSION_DENIED") => TtsError::AuthenticationFailed(message),
        (400, _) | (_, "INVALID_ARGUMENT") if markup => TtsError::InvalidMarkup(message),
        (400 | 404, _) | (_, "INVALID_ARGUMENT" | "NOT_FOUND") => TtsError::VoiceNotFound(message),
        (500..=599, _) | (_, "UNAVAILABLE" | "DEADLINE_EXCEEDED" | "INTERNAL") => {
            TtsError::ServiceUnavailable(message)
        }
        (code, _) => TtsError::ProviderApiError { status: code, message },
    }
}
