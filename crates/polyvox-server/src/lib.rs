mod cors;
mod health;

use std::net::SocketAddr;

use axum::Router;
use polyvox_config::Config;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// `shutdown` is handed to the feature servers so that waits on
    /// long-running Google operations end when the process stops.
    ///
    /// # Errors
    ///
    /// Returns an error if the synthesis or caption server fails to
    /// initialize
    pub fn new(config: &Config, shutdown: &CancellationToken) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 5050)));

        let tts_state = tts::build_server(config, shutdown)?;
        let subtitles_state = subtitles::build_server(config, shutdown)?;

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app
            .merge(tts::endpoint_router().with_state(tts_state))
            .merge(subtitles::endpoint_router().with_state(subtitles_state))
            .layer(TraceLayer::new_for_http());

        if let Some(cors_config) = &config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        Ok(Self { router: app, listen_address })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
