use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// Outbound request timeout in seconds
    pub request_timeout: u64,
    pub webhook: WebhookDefaults,
}

/// Fallback webhook target used when a push request carries no inline
/// `config` object. Both values are optional; requests that supply their own
/// config never consult these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookDefaults {
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5500".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number"))?,
            request_timeout: env::var("REQUEST_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            webhook: WebhookDefaults {
                webhook_url: env::var("WEBHOOK_URL").ok(),
                webhook_secret: env::var("WEBHOOK_SECRET").ok(),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
