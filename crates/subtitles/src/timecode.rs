use polyvox_config::SubtitleFormat;

/// Render `seconds` as a caption timestamp
///
/// Every component is floored, so `1.9999` renders as `00:00:01,999`.
/// SRT separates milliseconds with a comma and WebVTT with a dot.
/// Negative input is clamped to zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format(seconds: f64, kind: SubtitleFormat) -> String {
    let seconds = seconds.max(0.0);

    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let millis = ((seconds % 1.0) * 1000.0).floor() as u64;

    let separator = match kind {
        SubtitleFormat::Srt => ',',
        SubtitleFormat::Vtt => '.',
    };

    format!("{hours:02}:{minutes:02}:{secs:02}{separator}{millis:03}")
}
