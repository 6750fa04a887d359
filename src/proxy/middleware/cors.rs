// CORS layer
use tower_http::cors::{Any, CorsLayer};

/// Open CORS: browser-hosted agents call the proxy from arbitrary origins.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
