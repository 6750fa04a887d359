// Exchange credential pair
// The secret lives in a SecretString: no Debug/Display output, zeroed on drop

use secrecy::{ExposeSecret, SecretString};

use crate::error::AppError;

pub const API_KEY_ENV: &str = "GATEIO_API_KEY";
pub const API_SECRET_ENV: &str = "GATEIO_API_SECRET";

#[derive(Clone)]
pub struct ApiCredentials {
    api_key: String,
    api_secret: SecretString,
}

impl ApiCredentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
        }
    }

    /// Read `GATEIO_API_KEY` / `GATEIO_API_SECRET`.
    ///
    /// Empty values count as missing.
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = read_env(API_KEY_ENV)?;
        let api_secret = read_env(API_SECRET_ENV)?;
        Ok(Self::new(api_key, api_secret))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Only for feeding the HMAC key. Never log the return value.
    pub(crate) fn expose_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }
}

fn read_env(name: &'static str) -> Result<String, AppError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(AppError::MissingCredential(name)),
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}
