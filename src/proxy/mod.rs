// proxy module - signing reverse proxy for the Gate.io spot API

pub mod config;
pub mod server;

pub mod handlers; // API endpoint handlers
pub mod mappers; // Payload validation and response shaping
pub mod middleware; // Axum middleware
pub mod upstream; // Upstream client and request signing

pub use config::ProxyConfig;
pub use server::{build_router, AppState, AxumServer};
