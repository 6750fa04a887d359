// Middleware module - Axum middleware

pub mod auth;
pub mod cors;
pub mod logging;

pub use auth::auth_middleware;
pub use cors::cors_layer;
pub use logging::logging_middleware;
