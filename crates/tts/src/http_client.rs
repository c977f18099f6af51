use std::{sync::OnceLock, time::Duration};

use reqwest::Client;

/// Connection pool shared by the Text-to-Speech and Cloud Storage clients
///
/// Long-audio downloads can be large, so the overall timeout is generous;
/// the operation wait itself is bounded separately by its poll schedule.
pub fn http_client() -> Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();

    CLIENT
        .get_or_init(|| {
            Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(Duration::from_secs(300))
                .pool_idle_timeout(Some(Duration::from_secs(30)))
                .tcp_nodelay(true)
                .tcp_keepalive(Some(Duration::from_secs(60)))
                .build()
                .expect("Failed to build Google HTTP client")
        })
        .clone()
}
