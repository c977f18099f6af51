use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

/// HTTP listener settings
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind, `127.0.0.1:5050` when unset
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    /// Browser access; no CORS headers are sent when unset
    #[serde(default)]
    pub cors: Option<CorsConfig>,
}

/// Liveness endpoint; on by default at `/health`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default = "health_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: health_path(),
        }
    }
}

/// Cross-origin settings for browser clients
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins; empty or `"*"` allows any
    #[serde(default)]
    pub allow_origins: Vec<String>,
    /// Preflight cache lifetime
    #[serde(default, deserialize_with = "crate::duration::deserialize_option")]
    pub max_age: Option<Duration>,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allow_origins.is_empty() || self.allow_origins.iter().any(|origin| origin == "*")
    }
}

#[allow(clippy::missing_const_for_fn)]
fn enabled_by_default() -> bool {
    true
}

fn health_path() -> String {
    "/health".to_string()
}
