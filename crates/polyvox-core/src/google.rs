//! Pieces shared by every Google REST client

use http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-goog-api-key");

/// How requests to Google are authenticated
#[derive(Debug, Clone)]
pub enum GoogleCredentials {
    ApiKey(SecretString),
    AccessToken(SecretString),
}

impl GoogleCredentials {
    /// Prefer the API key, then the access token; empty values count as absent
    pub fn resolve(api_key: Option<&SecretString>, access_token: Option<&SecretString>) -> Option<Self> {
        let present = |secret: &&SecretString| !secret.expose_secret().is_empty();

        api_key
            .filter(present)
            .map(|key| Self::ApiKey(key.clone()))
            .or_else(|| access_token.filter(present).map(|token| Self::AccessToken(token.clone())))
    }

    /// Header carrying the credential
    ///
    /// # Errors
    ///
    /// Fails when the secret contains bytes not allowed in a header
    pub fn header(&self) -> Result<(HeaderName, HeaderValue), http::header::InvalidHeaderValue> {
        match self {
            Self::ApiKey(key) => {
                let mut value = HeaderValue::from_str(key.expose_secret())?;
                value.set_sensitive(true);
                Ok((API_KEY_HEADER, value))
            }
            Self::AccessToken(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))?;
                value.set_sensitive(true);
                Ok((AUTHORIZATION, value))
            }
        }
    }
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
struct Envelope {
    error: GoogleApiError,
}

/// `error` object of a failed Google API call or operation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleApiError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    /// Canonical status such as `INVALID_ARGUMENT`
    #[serde(default)]
    pub status: String,
}

impl GoogleApiError {
    /// Parse a failed response body, if it has the usual shape
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str::<Envelope>(body).ok().map(|envelope| envelope.error)
    }
}
