//! HTTP client initialization.
//!
//! This module builds the HTTP client used for geolocation lookups.

use std::sync::Arc;

use crate::config::{Config, LOOKUP_TIMEOUT_SLACK};
use reqwest::ClientBuilder;

/// Initializes the HTTP client for geolocation lookups.
///
/// Creates a `reqwest::Client` configured with:
/// - connect timeout and read timeout from the configuration
/// - an overall request deadline of connect + read plus a small slack, so a
///   server trickling bytes cannot hold a decision open indefinitely
/// - User-Agent from the configuration
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub async fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .connect_timeout(config.connect_timeout())
        .read_timeout(config.read_timeout())
        .timeout(config.connect_timeout() + config.read_timeout() + LOOKUP_TIMEOUT_SLACK)
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_client_with_defaults() {
        let result = init_client(&Config::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_init_client_with_short_timeouts() {
        let config = Config {
            connect_timeout_ms: 1,
            read_timeout_ms: 1,
            ..Default::default()
        };
        assert!(init_client(&config).await.is_ok());
    }
}
