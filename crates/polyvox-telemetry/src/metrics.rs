//! Metric names and instrument helpers
//!
//! Instruments come from the global meter, so recording is a no-op until
//! [`crate::init`] installs an exporting provider.

use std::time::Instant;

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram, Meter};

// Synthesis
pub const TTS_SYNTHESIS_COUNT: &str = "tts.synthesis.count";
pub const TTS_SYNTHESIS_DURATION: &str = "tts.synthesis.duration";
pub const TTS_FALLBACK_COUNT: &str = "tts.fallback.count";

// Captions
pub const SUBTITLES_RENDER_COUNT: &str = "subtitles.render.count";

/// Meter shared by all Polyvox instruments
pub fn meter() -> Meter {
    opentelemetry::global::meter("polyvox")
}

pub fn counter(name: &'static str) -> Counter<u64> {
    meter().u64_counter(name).build()
}

pub fn histogram(name: &'static str) -> Histogram<f64> {
    meter().f64_histogram(name).with_unit("s").build()
}

/// Record the time since `start` in seconds
pub fn record_duration(histogram: &Histogram<f64>, start: Instant, attributes: &[KeyValue]) {
    histogram.record(start.elapsed().as_secs_f64(), attributes);
}
