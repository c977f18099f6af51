use http::{HeaderName, HeaderValue, Method, header::CONTENT_TYPE};
use polyvox_config::CorsConfig;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Response headers browser clients may read
const EXPOSED_HEADERS: [HeaderName; 2] = [
    HeaderName::from_static("x-synthesis-method"),
    HeaderName::from_static("x-synthesis-chunks"),
];

/// Build a Tower CORS layer from configuration
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .filter_map(|origin| origin.trim_end_matches('/').parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    let mut layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .expose_headers(EXPOSED_HEADERS);

    if let Some(max_age) = config.max_age {
        layer = layer.max_age(max_age);
    }

    layer
}
