#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod audio;
mod chunked;
mod error;
mod http_client;
mod markup;
mod provider;
mod request;
mod server;
#[cfg(test)]
mod testing;
mod tiers;
mod types;
mod voices;

use std::sync::Arc;

use axum::{Router, extract::State, routing::post};
use polyvox_core::CancellationToken;

pub use error::{FailureKind, Result, TtsError};
pub use markup::{minimal_markup, style_to_markup};
pub use provider::{AudioEncoding, SpeechSynthesizer, SynthesisCall, SynthesisInput};
pub use server::{Server, TtsServerBuilder};
pub use tiers::{Tier, entry_tier};
pub use types::{SpeakingStyle, SpeechPayload, SynthesisMethod, SynthesisRequest, SynthesisResult};
use request::ExtractPayload;

/// Build the synthesis server from configuration
pub fn build_server(config: &polyvox_config::Config, shutdown: &CancellationToken) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        TtsServerBuilder::new(config)
            .shutdown(shutdown.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize TTS server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for speech synthesis
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/v1/audio/speech", post(synthesize))
}

/// Handle speech synthesis requests
async fn synthesize(
    State(server): State<Arc<Server>>,
    ExtractPayload(payload): ExtractPayload<SpeechPayload>,
) -> Result<axum::response::Response> {
    tracing::debug!("TTS speech handler called, {} bytes of input", payload.input.len());

    let result = server.synthesize(payload).await?;

    tracing::debug!(
        "Speech synthesis complete via {} ({} bytes)",
        result.method.as_str(),
        result.audio.len()
    );

    Ok(result.into_response())
}
