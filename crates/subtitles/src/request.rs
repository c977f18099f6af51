use axum::{Json, body::Body, response::IntoResponse};
use http::StatusCode;
use polyvox_core::{ErrorBody, ErrorDetails};
use serde::de::DeserializeOwned;

/// Extractor for JSON request bodies
pub struct ExtractPayload<T>(pub T);

/// Body limit (16 MiB); word lists for long recordings get large
const BODY_LIMIT_BYTES: usize = 16 << 20;

impl<S, T: DeserializeOwned> axum::extract::FromRequest<S> for ExtractPayload<T>
where
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        let is_json = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"));

        if !is_json {
            return Err(rejection(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported Content-Type, expected: 'Content-Type: application/json'".to_string(),
            ));
        }

        let bytes = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                rejection(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("Request body is too large, limit is {BODY_LIMIT_BYTES} bytes"),
                )
            } else {
                rejection(StatusCode::BAD_REQUEST, format!("Failed to read request body: {err}"))
            }
        })?;

        serde_json::from_slice::<T>(&bytes)
            .map(Self)
            .map_err(|e| rejection(StatusCode::BAD_REQUEST, format!("Failed to parse request body: {e}")))
    }
}

fn rejection(status: StatusCode, message: String) -> axum::response::Response {
    let body = ErrorBody {
        error: ErrorDetails {
            message,
            r#type: "invalid_request_error".to_string(),
            code: status.as_u16(),
        },
    };

    (status, Json(body)).into_response()
}
