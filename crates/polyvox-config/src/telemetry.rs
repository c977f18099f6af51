use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Log and OTLP export settings
///
/// Without an `exporter` only console logging is set up.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Extra resource attributes attached to every span and metric
    #[serde(default)]
    pub resource_attributes: BTreeMap<String, String>,
    /// Log filter directive, e.g. `info,tts=debug`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Emit logs as JSON lines instead of the human format
    #[serde(default)]
    pub json_logs: bool,
    /// OTLP collector for traces and metrics
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
    /// Fraction of root traces sampled (0.0 to 1.0)
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
    /// Metric export interval
    #[serde(default = "default_metrics_interval", deserialize_with = "crate::duration::deserialize")]
    pub metrics_interval: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            resource_attributes: BTreeMap::new(),
            log_filter: default_log_filter(),
            json_logs: false,
            exporter: None,
            sampling_rate: default_sampling_rate(),
            metrics_interval: default_metrics_interval(),
        }
    }
}

/// OTLP collector endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub endpoint: Url,
    #[serde(default)]
    pub protocol: ExportProtocol,
}

/// OTLP transport
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportProtocol {
    #[default]
    Grpc,
    HttpProto,
}

fn default_service_name() -> String {
    "polyvox".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_sampling_rate() -> f64 {
    1.0
}

#[allow(clippy::missing_const_for_fn)]
fn default_metrics_interval() -> Duration {
    Duration::from_secs(30)
}
