use secrecy::SecretString;
use serde::Deserialize;

/// Google Cloud credentials and endpoint overrides
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleConfig {
    /// API key sent as `x-goog-api-key`
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// OAuth access token sent as a bearer token
    #[serde(default)]
    pub access_token: Option<SecretString>,
    /// Project identifier, required only by the long-audio tier
    #[serde(default)]
    pub project_id: Option<String>,
    /// Bucket that receives long-audio output
    #[serde(default)]
    pub storage_bucket: Option<String>,
    /// Location used in long-audio resource names
    #[serde(default = "default_location")]
    pub location: String,
    /// Base URL overrides, mostly for tests
    #[serde(default)]
    pub endpoints: GoogleEndpoints,
}

/// Base URL overrides for each Google service
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleEndpoints {
    #[serde(default)]
    pub text_to_speech: Option<String>,
    #[serde(default)]
    pub speech: Option<String>,
    #[serde(default)]
    pub translate: Option<String>,
    #[serde(default)]
    pub storage: Option<String>,
}

impl GoogleConfig {
    /// Project id, treating an empty string as unset
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Output bucket, treating an empty string as unset
    pub fn storage_bucket(&self) -> Option<&str> {
        self.storage_bucket.as_deref().filter(|bucket| !bucket.trim().is_empty())
    }
}

fn default_location() -> String {
    "global".to_string()
}
