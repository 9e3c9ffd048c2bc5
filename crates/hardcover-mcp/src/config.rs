//! Gateway configuration

use hardcover_client::{HardcoverClient, DEFAULT_API_URL};
use std::fmt;

use crate::{McpError, McpResult};

pub const API_KEY_ENV: &str = "HARDCOVER_API_KEY";
pub const API_URL_ENV: &str = "HARDCOVER_API_URL";

/// Values a session is constructed from. The credential is never compiled in.
#[derive(Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub api_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { api_key: None, api_url: DEFAULT_API_URL.to_string() }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl GatewayConfig {
    pub fn new(api_key: Option<String>, api_url: impl Into<String>) -> Self {
        Self { api_key, api_url: api_url.into() }
    }

    /// Credential, if one is set and not blank
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Fail when no credential is configured
    pub fn require_credential(&self) -> McpResult<&str> {
        self.credential()
            .ok_or_else(|| McpError::Config(format!("{} environment variable is required", API_KEY_ENV)))
    }

    /// Provider for this configuration. Without a credential every call fails
    /// individually instead of at startup.
    pub fn build_provider(&self) -> McpResult<HardcoverClient> {
        Ok(HardcoverClient::with_endpoint(self.credential().unwrap_or_default(), &self.api_url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credential_is_treated_as_missing() {
        let config = GatewayConfig::new(Some("  ".into()), DEFAULT_API_URL);
        assert!(config.credential().is_none());
        assert!(matches!(config.require_credential(), Err(McpError::Config(_))));
    }

    #[test]
    fn debug_output_redacts_the_credential() {
        let config = GatewayConfig::new(Some("secret-token".into()), DEFAULT_API_URL);
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn provider_builds_without_credential() {
        let provider = GatewayConfig::default().build_provider().unwrap();
        assert!(!provider.has_credential());
    }
}
