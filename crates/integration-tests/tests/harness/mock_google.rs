//! Mock Google Cloud backend for integration tests
//!
//! One listener answers for Text-to-Speech, long audio, Cloud Storage,
//! Speech-to-Text and Translate. Requests are dispatched on the path, so
//! the `resource:verb` URLs Google uses need no router support.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

const LONG_AUDIO_OPERATION: &str = "operations/long-audio-1";
const RECOGNITION_OPERATION: &str = "recognize-1";

/// Mock Google backend that returns predictable responses
pub struct MockGoogle {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockGoogleState>,
}

#[derive(Default)]
struct MockGoogleState {
    synthesize_count: AtomicU32,
    markup_count: AtomicU32,
    long_audio_count: AtomicU32,
    download_count: AtomicU32,
    recognize_count: AtomicU32,
    translate_count: AtomicU32,
    /// Number of synchronous synthesis calls to fail with 503
    fail_synthesize: AtomicU32,
    /// Reject every synthesis call with 403
    reject_credentials: AtomicBool,
    /// Finish long-audio operations with an error
    fail_long_audio: AtomicBool,
    /// Recognition finds nothing
    silent: AtomicBool,
}

impl MockGoogle {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockGoogleState::default());

        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Fail the next `n` synchronous synthesis calls with 503
    pub fn fail_synthesize(&self, n: u32) {
        self.state.fail_synthesize.store(n, Ordering::SeqCst);
    }

    pub fn reject_credentials(&self) {
        self.state.reject_credentials.store(true, Ordering::SeqCst);
    }

    pub fn fail_long_audio(&self) {
        self.state.fail_long_audio.store(true, Ordering::SeqCst);
    }

    pub fn silent(&self) {
        self.state.silent.store(true, Ordering::SeqCst);
    }

    pub fn synthesize_count(&self) -> u32 {
        self.state.synthesize_count.load(Ordering::SeqCst)
    }

    pub fn markup_count(&self) -> u32 {
        self.state.markup_count.load(Ordering::SeqCst)
    }

    pub fn long_audio_count(&self) -> u32 {
        self.state.long_audio_count.load(Ordering::SeqCst)
    }

    pub fn download_count(&self) -> u32 {
        self.state.download_count.load(Ordering::SeqCst)
    }

    pub fn recognize_count(&self) -> u32 {
        self.state.recognize_count.load(Ordering::SeqCst)
    }

    pub fn translate_count(&self) -> u32 {
        self.state.translate_count.load(Ordering::SeqCst)
    }
}

impl Drop for MockGoogle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// A short mono WAV clip
pub fn wav_clip() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 24_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut out = Vec::new();
    let mut writer = hound::WavWriter::new(Cursor::new(&mut out), spec).expect("wav writer");
    for sample in [0i16, 1000, -1000, 0] {
        writer.write_sample(sample).expect("wav sample");
    }
    writer.finalize().expect("wav finalize");
    out
}

fn google_error(status: StatusCode, google_status: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {"code": status.as_u16(), "message": message, "status": google_status}
        })),
    )
        .into_response()
}

async fn handle(State(state): State<Arc<MockGoogleState>>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri.path();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let post = method == Method::POST;

    match (post, path) {
        (true, "/v1/text:synthesize") => synthesize(&state, &body),
        (true, p) if p.ends_with(":synthesizeLongAudio") => {
            state.long_audio_count.fetch_add(1, Ordering::SeqCst);
            Json(json!({"name": LONG_AUDIO_OPERATION, "done": false})).into_response()
        }
        (false, p) if p == format!("/v1/{LONG_AUDIO_OPERATION}") => {
            if state.fail_long_audio.load(Ordering::SeqCst) {
                Json(json!({
                    "name": LONG_AUDIO_OPERATION,
                    "done": true,
                    "error": {"code": 13, "message": "synthesis backend crashed", "status": "INTERNAL"}
                }))
                .into_response()
            } else {
                Json(json!({"name": LONG_AUDIO_OPERATION, "done": true, "response": {}})).into_response()
            }
        }
        (false, p) if p.starts_with("/storage/v1/b/") => {
            state.download_count.fetch_add(1, Ordering::SeqCst);
            (StatusCode::OK, wav_clip()).into_response()
        }
        (true, "/v1/speech:longrunningrecognize") => {
            state.recognize_count.fetch_add(1, Ordering::SeqCst);
            Json(json!({"name": RECOGNITION_OPERATION})).into_response()
        }
        (false, p) if p == format!("/v1/operations/{RECOGNITION_OPERATION}") => recognition(&state),
        (true, "/language/translate/v2") => {
            state.translate_count.fetch_add(1, Ordering::SeqCst);
            Json(json!({
                "data": {"translations": [{"translatedText": "Hola a todos y bienvenidos de nuevo al canal de cocina"}]}
            }))
            .into_response()
        }
        _ => google_error(StatusCode::NOT_FOUND, "NOT_FOUND", "no such mock route"),
    }
}

fn synthesize(state: &MockGoogleState, body: &Value) -> Response {
    state.synthesize_count.fetch_add(1, Ordering::SeqCst);

    if body["input"].get("ssml").is_some() {
        state.markup_count.fetch_add(1, Ordering::SeqCst);
    }

    if state.reject_credentials.load(Ordering::SeqCst) {
        return google_error(StatusCode::FORBIDDEN, "PERMISSION_DENIED", "API key not valid");
    }

    let failing = state
        .fail_synthesize
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return google_error(StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", "The service is currently unavailable");
    }

    Json(json!({"audioContent": BASE64.encode(wav_clip())})).into_response()
}

fn recognition(state: &MockGoogleState) -> Response {
    if state.silent.load(Ordering::SeqCst) {
        return Json(json!({"name": RECOGNITION_OPERATION, "done": true, "response": {}})).into_response();
    }

    let words: Vec<Value> = "Hello everyone and welcome back to the cooking channel"
        .split(' ')
        .enumerate()
        .map(|(i, word)| {
            json!({
                "word": word,
                "startTime": format!("{i}.000s"),
                "endTime": format!("{i}.500s")
            })
        })
        .collect();

    Json(json!({
        "name": RECOGNITION_OPERATION,
        "done": true,
        "response": {
            "results": [{"alternatives": [{
                "transcript": "Hello everyone and welcome back to the cooking channel",
                "words": words
            }]}]
        }
    }))
    .into_response()
}
