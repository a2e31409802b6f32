//! Configuration loading and management

use crate::core::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the default subdomain
pub const SUBDOMAIN_ENV: &str = "MARKETPLACE_SUBDOMAIN";

/// Environment variable overriding the GraphQL endpoint
pub const ENDPOINT_ENV: &str = "STOREFRONT_GRAPHQL_ENDPOINT";

/// Request header carrying the marketplace subdomain
pub const SUBDOMAIN_HEADER: &str = "x-holaplex-subdomain";

fn default_placeholder_count() -> usize {
    8
}

fn default_event_capacity() -> usize {
    1024
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Storefront configuration
///
/// ```yaml
/// subdomain: skellies
/// graphql_endpoint: https://graph.holaplex.com/v1
/// placeholder_count: 12
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Subdomain used when a request does not carry one
    #[serde(default)]
    pub subdomain: Option<String>,

    /// GraphQL endpoint of the indexer
    #[serde(default)]
    pub graphql_endpoint: Option<String>,

    /// Loading placeholders rendered while a query is in flight
    #[serde(default = "default_placeholder_count")]
    pub placeholder_count: usize,

    /// Buffer size of the query event bus
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Timeout applied to each HTTP request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            subdomain: None,
            graphql_endpoint: None,
            placeholder_count: default_placeholder_count(),
            event_capacity: default_event_capacity(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MARKETPLACE_SUBDOMAIN` and `STOREFRONT_GRAPHQL_ENDPOINT`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(SUBDOMAIN_ENV).ok(),
            std::env::var(ENDPOINT_ENV).ok(),
        )
    }

    fn with_overrides(mut self, subdomain: Option<String>, endpoint: Option<String>) -> Self {
        if let Some(subdomain) = subdomain.filter(|s| !s.is_empty()) {
            self.subdomain = Some(subdomain);
        }
        if let Some(endpoint) = endpoint.filter(|s| !s.is_empty()) {
            self.graphql_endpoint = Some(endpoint);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "event_capacity".to_string(),
                message: "must be greater than zero".to_string(),
            }
            .into());
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Subdomain for a request: header value first, configured default second
    pub fn resolve_subdomain(&self, header: Option<&str>) -> Option<String> {
        header
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.subdomain.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, StorefrontConfig::default());
        assert_eq!(config.placeholder_count, 8);
    }

    #[test]
    fn test_yaml_values() {
        let config = StorefrontConfig::from_yaml_str(
            "subdomain: skellies\ngraphql_endpoint: http://localhost:4000/graphql\nplaceholder_count: 12\n",
        )
        .unwrap();
        assert_eq!(config.subdomain.as_deref(), Some("skellies"));
        assert_eq!(config.placeholder_count, 12);
    }

    #[test]
    fn test_invalid_capacity() {
        let err = StorefrontConfig::from_yaml_str("event_capacity: 0").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_missing_file() {
        let err = StorefrontConfig::from_yaml_file("/nonexistent/storefront.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/storefront.yaml"));
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::default()
            .with_overrides(Some("skellies".to_string()), Some(String::new()));
        assert_eq!(config.subdomain.as_deref(), Some("skellies"));
        assert_eq!(config.graphql_endpoint, None);
    }

    #[test]
    fn test_resolve_subdomain_prefers_header() {
        let config = StorefrontConfig {
            subdomain: Some("fallback".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_subdomain(Some("skellies")).as_deref(), Some("skellies"));
        assert_eq!(config.resolve_subdomain(Some("  ")).as_deref(), Some("fallback"));
        assert_eq!(config.resolve_subdomain(None).as_deref(), Some("fallback"));
        assert_eq!(StorefrontConfig::default().resolve_subdomain(None), None);
    }
}
