use http::StatusCode;
use serde::Serialize;

/// Domain errors that know how to present themselves over HTTP
///
/// Feature crates implement this for their error enums; the axum glue in
/// each crate turns [`HttpError::error_body`] into a JSON response.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `invalid_request_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;

    /// Body in the `{ "error": { message, type, code } }` shape
    fn error_body(&self) -> ErrorBody {
        ErrorBody {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: self.status_code().as_u16(),
            },
        }
    }
}

/// Serialized error envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub message: String,
    pub r#type: String,
    pub code: u16,
}
