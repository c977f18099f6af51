//! Polyvox on a random port, wired to a [`MockGoogle`] backend

use std::net::SocketAddr;

use polyvox_config::Config;
use polyvox_server::Server;
use reqwest::StatusCode;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::config::ConfigBuilder;
use super::mock_google::MockGoogle;

/// A running Polyvox instance, shut down on drop
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

/// A `/v1/audio/speech` reply, read to completion
pub struct Speech {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub method: Option<String>,
    pub chunks: Option<u32>,
    pub body: Vec<u8>,
}

impl Speech {
    /// Error replies are JSON
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("speech reply is not JSON")
    }
}

impl TestServer {
    /// Start against `mock` with the default test settings
    pub async fn with_mock(mock: &MockGoogle) -> Self {
        Self::configured(mock, std::convert::identity).await
    }

    /// Start against `mock` after adjusting the test settings
    pub async fn configured(mock: &MockGoogle, adjust: impl FnOnce(ConfigBuilder) -> ConfigBuilder) -> Self {
        let config = adjust(ConfigBuilder::new(&mock.base_url())).build();
        Self::start(config).await.expect("polyvox failed to start")
    }

    /// Start with `config`, listening on an ephemeral port
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let shutdown = CancellationToken::new();
        let router = Server::new(&config, &shutdown)?.into_router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let stop = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { stop.cancelled().await })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.expect("GET failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    /// Synthesize `body` and collect the synthesis headers
    pub async fn speak(&self, body: &Value) -> Speech {
        let resp = self.post_json("/v1/audio/speech", body).await;
        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let status = resp.status();
        let content_type = header("content-type");
        let method = header("x-synthesis-method");
        let chunks = header("x-synthesis-chunks").map(|v| v.parse().expect("chunk count is not a number"));
        let body = resp.bytes().await.expect("speech body unreadable").to_vec();

        Speech {
            status,
            content_type,
            method,
            chunks,
            body,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
