// Upstream module - Gate.io REST API access

pub mod client;
pub mod credentials;
pub mod envelope;
pub mod signer;

pub use client::UpstreamClient;
pub use credentials::ApiCredentials;
pub use envelope::{UpstreamBody, UpstreamEnvelope};
pub use signer::{RequestSigner, SignedRequest, TimeSource};

// Spot endpoints, all under the /api/v4 prefix
pub const SPOT_ACCOUNTS: &str = "/api/v4/spot/accounts";
pub const SPOT_ORDERS: &str = "/api/v4/spot/orders";
pub const SPOT_TIME: &str = "/api/v4/spot/time";
pub const SPOT_CURRENCY_PAIRS: &str = "/api/v4/spot/currency_pairs";
