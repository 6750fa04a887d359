pub mod error;
pub mod modules;
pub mod proxy; // Proxy service module

pub use error::{AppError, AppResult, ProxyError};
pub use proxy::{build_router, AppState, AxumServer, ProxyConfig};
