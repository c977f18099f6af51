use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use polyvox_core::HttpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SubtitleError>;

/// Caption generation errors with appropriate HTTP status codes
#[derive(Debug, Error)]
pub enum SubtitleError {
    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Recognition finished without any results
    #[error("No speech detected in the audio")]
    NoSpeech,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Transient failure of a Google service
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    #[error("Recognition did not finish within {0:?}")]
    OperationTimedOut(Duration),

    /// The recognition operation finished with an error
    #[error("Recognition failed: {0}")]
    OperationFailed(String),

    #[error("Caption generation was cancelled")]
    Cancelled,

    /// Provider API returned an error we do not classify further
    #[error("Provider API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// Network or connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Internal server error
    /// If Some(message), it came from a provider and can be shown
    /// If None, it's an internal error and should not leak details
    #[error("Internal server error")]
    InternalError(Option<String>),
}

impl HttpError for SubtitleError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::NoSpeech => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            Self::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceUnavailable(_) | Self::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            Self::OperationTimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::OperationFailed(_) | Self::ConnectionError(_) => StatusCode::BAD_GATEWAY,
            Self::ProviderApiError { status, .. } => match *status {
                400 => StatusCode::BAD_REQUEST,
                404 => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::ConfigMissing(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) | Self::NoSpeech => "invalid_request_error",
            Self::AuthenticationFailed(_) => "authentication_error",
            Self::QuotaExceeded(_) => "rate_limit_error",
            Self::ServiceUnavailable(_)
            | Self::OperationTimedOut(_)
            | Self::OperationFailed(_)
            | Self::Cancelled
            | Self::ConnectionError(_)
            | Self::ProviderApiError { .. } => "api_error",
            Self::ConfigMissing(_) | Self::InternalError(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::InternalError(Some(provider_msg)) => provider_msg.clone(),
            Self::InternalError(None) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for SubtitleError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.error_body())).into_response()
    }
}
