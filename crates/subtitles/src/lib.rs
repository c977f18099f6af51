#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod cues;
mod error;
mod http_client;
mod provider;
mod request;
mod server;
pub mod timecode;
mod types;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use polyvox_core::CancellationToken;

pub use cues::{CaptionCue, bucketize, cues, render};
pub use error::{Result, SubtitleError};
pub use provider::{RecognitionRequest, Transcriber, Translator, recognition_model};
pub use server::{Server, SubtitlesServerBuilder};
pub use types::{RenderPayload, RenderResponse, SubtitlePayload, SubtitleResponse, TimedWord, Transcript};
use request::ExtractPayload;

/// Build the caption server from configuration
pub fn build_server(config: &polyvox_config::Config, shutdown: &CancellationToken) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        SubtitlesServerBuilder::new(config)
            .shutdown(shutdown.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize subtitles server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for captions
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new()
        .route("/v1/subtitles", post(generate))
        .route("/v1/subtitles/render", post(render_subtitles))
}

/// Handle full pipeline requests
async fn generate(
    State(server): State<Arc<Server>>,
    ExtractPayload(payload): ExtractPayload<SubtitlePayload>,
) -> Result<Json<SubtitleResponse>> {
    tracing::debug!("Subtitles handler called for {}", payload.audio_uri);

    let response = server.generate(payload).await?;

    tracing::debug!("Subtitle generation complete");

    Ok(Json(response))
}

/// Handle render-only requests
async fn render_subtitles(
    State(server): State<Arc<Server>>,
    ExtractPayload(payload): ExtractPayload<RenderPayload>,
) -> Result<Json<RenderResponse>> {
    tracing::debug!("Subtitle render handler called with {} words", payload.words.len());

    Ok(Json(server.render(payload)?))
}
