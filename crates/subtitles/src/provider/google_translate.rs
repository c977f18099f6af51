use async_trait::async_trait;
use polyvox_config::GoogleConfig;
use polyvox_core::GoogleCredentials;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Translator, classify};
use crate::{error::SubtitleError, http_client::http_client};

const DEFAULT_TRANSLATE_API_URL: &str = "https://translation.googleapis.com";

/// Google Cloud Translation (v2 basic) over REST
pub(crate) struct GoogleTranslate {
    client: Client,
    base_url: String,
    credentials: GoogleCredentials,
}

impl GoogleTranslate {
    pub fn new(credentials: GoogleCredentials, google: &GoogleConfig) -> Self {
        Self {
            client: http_client(),
            base_url: google
                .endpoints
                .translate
                .clone()
                .unwrap_or_else(|| DEFAULT_TRANSLATE_API_URL.to_string()),
            credentials,
        }
    }
}

#[derive(Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslationList,
}

#[derive(Deserialize)]
struct TranslationList {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// v2 takes bare language codes, so `en-US` becomes `en`
fn bare_language(code: &str) -> &str {
    code.split_once('-').map_or(code, |(language, _)| language)
}

#[async_trait]
impl Translator for GoogleTranslate {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> crate::error::Result<String> {
        let url = format!("{}/language/translate/v2", self.base_url);
        let (header, value) = self
            .credentials
            .header()
            .map_err(|e| SubtitleError::ConfigMissing(format!("unusable Google credential: {e}")))?;

        let source = bare_language(source_lang);

        tracing::debug!("Translating {} characters from {source} to {target_lang}", text.len());

        let response = self
            .client
            .post(&url)
            .header(header, value)
            .json(&TranslateBody {
                q: text,
                source,
                target: target_lang,
                format: "text",
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Translate request failed: {e}");
                SubtitleError::ConnectionError(format!("Failed to send request to Translate: {e}"))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Translate API error ({status}): {error_text}");
            return Err(classify("Translate", status, &error_text));
        }

        let response: TranslateResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to read Translate response body: {e}");
            SubtitleError::InternalError(None)
        })?;

        let translated = response
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| SubtitleError::InternalError(Some("Translate returned no translations".into())))?;

        tracing::debug!("Translation complete, {} characters", translated.len());

        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn translate(server: &MockServer) -> GoogleTranslate {
        let google = GoogleConfig {
            endpoints: polyvox_config::GoogleEndpoints {
                translate: Some(server.uri()),
                ..Default::default()
            },
            ..Default::default()
        };

        GoogleTranslate::new(GoogleCredentials::AccessToken(SecretString::from("token")), &google)
    }

    #[test]
    fn region_is_trimmed() {
        assert_eq!(bare_language("en-US"), "en");
        assert_eq!(bare_language("zh-TW"), "zh");
        assert_eq!(bare_language("es"), "es");
    }

    #[tokio::test]
    async fn translates_plain_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/language/translate/v2"))
            .and(header("authorization", "Bearer token"))
            .and(body_json(json!({
                "q": "Hello there.",
                "source": "en",
                "target": "es",
                "format": "text"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"translations": [{"translatedText": "Hola."}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let translated = translate(&server).translate("Hello there.", "en-US", "es").await.unwrap();

        assert_eq!(translated, "Hola.");
    }

    #[tokio::test]
    async fn unsupported_language_is_a_bad_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "Bad language pair: en|xx", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let err = translate(&server).translate("Hi", "en-US", "xx").await.unwrap_err();

        assert!(matches!(err, SubtitleError::InvalidRequest(_)));
    }
}
