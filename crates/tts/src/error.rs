use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use polyvox_core::HttpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Classification of a synthesis failure
///
/// Tiers decide whether to fall through to the next tier from the kind
/// alone, never from the error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ServiceUnavailable,
    QuotaExceeded,
    VoiceNotFound,
    InvalidMarkup,
    ConfigMissing,
    OperationTimedOut,
    OperationFailed,
    Cancelled,
    AuthenticationFailed,
    InvalidRequest,
    Internal,
}

impl FailureKind {
    /// Whether a failure of this kind moves the request to the next tier
    pub const fn cascades(self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable
                | Self::QuotaExceeded
                | Self::VoiceNotFound
                | Self::InvalidMarkup
                | Self::ConfigMissing
                | Self::OperationTimedOut
                | Self::OperationFailed
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServiceUnavailable => "service_unavailable",
            Self::QuotaExceeded => "quota_exceeded",
            Self::VoiceNotFound => "voice_not_found",
            Self::InvalidMarkup => "invalid_markup",
            Self::ConfigMissing => "config_missing",
            Self::OperationTimedOut => "operation_timed_out",
            Self::OperationFailed => "operation_failed",
            Self::Cancelled => "cancelled",
            Self::AuthenticationFailed => "authentication_failed",
            Self::InvalidRequest => "invalid_request",
            Self::Internal => "internal",
        }
    }
}

/// Speech synthesis errors with appropriate HTTP status codes
#[derive(Debug, Error)]
pub enum TtsError {
    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Credentials rejected by Google
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested voice does not exist for the language
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// The service rejected the speech markup
    #[error("Invalid speech markup: {0}")]
    InvalidMarkup(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Transient failure of the synthesis service
    #[error("Synthesis service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A setting required by the selected tier is absent
    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    #[error("Synthesis operation did not finish within {0:?}")]
    OperationTimedOut(Duration),

    /// The long-running operation finished with an error
    #[error("Synthesis operation failed: {0}")]
    OperationFailed(String),

    #[error("Synthesis was cancelled")]
    Cancelled,

    /// Provider API returned an error we do not classify further
    #[error("Provider API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// Network or connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Joining or exporting audio failed
    #[error("Audio processing failed: {0}")]
    AudioError(String),

    /// Internal server error
    /// If Some(message), it came from a provider and can be shown
    /// If None, it's an internal error and should not leak details
    #[error("Internal server error")]
    InternalError(Option<String>),
}

impl TtsError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidRequest(_) => FailureKind::InvalidRequest,
            Self::AuthenticationFailed(_) => FailureKind::AuthenticationFailed,
            Self::VoiceNotFound(_) => FailureKind::VoiceNotFound,
            Self::InvalidMarkup(_) => FailureKind::InvalidMarkup,
            Self::QuotaExceeded(_) => FailureKind::QuotaExceeded,
            Self::ServiceUnavailable(_) | Self::ConnectionError(_) => FailureKind::ServiceUnavailable,
            Self::ConfigMissing(_) => FailureKind::ConfigMissing,
            Self::OperationTimedOut(_) => FailureKind::OperationTimedOut,
            Self::OperationFailed(_) => FailureKind::OperationFailed,
            Self::Cancelled => FailureKind::Cancelled,
            Self::ProviderApiError { .. } | Self::AudioError(_) | Self::InternalError(_) => FailureKind::Internal,
        }
    }
}

impl HttpError for TtsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::VoiceNotFound(_) | Self::InvalidMarkup(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            Self::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceUnavailable(_) | Self::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            Self::OperationTimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::OperationFailed(_) | Self::ConnectionError(_) => StatusCode::BAD_GATEWAY,
            Self::ProviderApiError { status, .. } => match *status {
                400 => StatusCode::BAD_REQUEST,
                403 => StatusCode::FORBIDDEN,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::ConfigMissing(_) | Self::AudioError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) | Self::VoiceNotFound(_) | Self::InvalidMarkup(_) => "invalid_request_error",
            Self::AuthenticationFailed(_) => "authentication_error",
            Self::QuotaExceeded(_) => "rate_limit_error",
            Self::ServiceUnavailable(_)
            | Self::OperationTimedOut(_)
            | Self::OperationFailed(_)
            | Self::Cancelled
            | Self::ConnectionError(_)
            | Self::ProviderApiError { .. } => "api_error",
            Self::ConfigMissing(_) | Self::AudioError(_) | Self::InternalError(_) => "internal_error",
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

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.error_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_set_is_explicit() {
        let cascading = [
            FailureKind::ServiceUnavailable,
            FailureKind::QuotaExceeded,
            FailureKind::VoiceNotFound,
            FailureKind::InvalidMarkup,
            FailureKind::ConfigMissing,
            FailureKind::OperationTimedOut,
            FailureKind::OperationFailed,
        ];
        let terminal = [
            FailureKind::Cancelled,
            FailureKind::AuthenticationFailed,
            FailureKind::InvalidRequest,
            FailureKind::Internal,
        ];

        assert!(cascading.iter().all(|k| k.cascades()));
        assert!(terminal.iter().all(|k| !k.cascades()));
    }

    #[test]
    fn connection_errors_count_as_unavailable() {
        let err = TtsError::ConnectionError("reset by peer".into());
        assert_eq!(err.kind(), FailureKind::ServiceUnavailable);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let body = TtsError::InternalError(None).error_body();
        assert_eq!(body.error.message, "Internal server error");
        assert_eq!(body.error.code, 500);
        assert_eq!(body.error.r#type, "internal_error");
    }

    #[test]
    fn quota_maps_to_429() {
        let err = TtsError::QuotaExceeded("per-minute limit".into());
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.error_type(), "rate_limit_error");
    }
}
