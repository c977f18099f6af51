use std::{sync::OnceLock, time::Duration};

use reqwest::Client;

/// Connection pool shared by the Speech-to-Text and Translate clients
pub fn http_client() -> Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();

    CLIENT
        .get_or_init(|| {
            Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(Duration::from_secs(120))
                .pool_idle_timeout(Some(Duration::from_secs(30)))
                .tcp_nodelay(true)
                .build()
                .expect("Failed to build Google HTTP client")
        })
        .clone()
}
