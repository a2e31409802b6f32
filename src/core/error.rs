//! Typed error handling for the storefront engine
//!
//! # Error Categories
//!
//! - [`ConfigError`]: configuration loading and validation
//! - [`QueryError`]: failures reported by the asset query service and other
//!   external collaborators
//! - [`PageError`]: page context could not be resolved (not found)
//! - [`SyncError`]: the query synchronizer could not be mounted
//!
//! Every error carries a stable [`StorefrontError::error_code`] so callers can
//! match on a string when they do not want to match on the enum.

use thiserror::Error;

/// The main error type for the storefront engine
#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Internal errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorefrontError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            StorefrontError::Config(_) => "CONFIG_ERROR",
            StorefrontError::Query(e) => e.error_code(),
            StorefrontError::Page(e) => e.error_code(),
            StorefrontError::Sync(_) => "SYNC_ERROR",
            StorefrontError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this error means the requested page does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorefrontError::Page(_))
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors reported while talking to an external collaborator
#[derive(Debug, Error)]
pub enum QueryError {
    /// Transport failure (connection refused, timeout, non-2xx status)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with one or more GraphQL errors
    #[error("Query rejected: {}", messages.join("; "))]
    Rejected { messages: Vec<String> },

    /// The response did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The backing store could not be accessed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl QueryError {
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::Transport(_) => "QUERY_TRANSPORT_ERROR",
            QueryError::Rejected { .. } => "QUERY_REJECTED",
            QueryError::Malformed(_) => "QUERY_MALFORMED_RESPONSE",
            QueryError::Storage(_) => "QUERY_STORAGE_ERROR",
        }
    }
}

// =============================================================================
// Page Errors
// =============================================================================

/// A page-level lookup found nothing to render
#[derive(Debug, Error)]
pub enum PageError {
    #[error("No marketplace for subdomain '{subdomain}'")]
    MarketplaceNotFound { subdomain: String },

    #[error("No storefront for subdomain '{subdomain}'")]
    StorefrontNotFound { subdomain: String },

    #[error("No creator with address '{address}'")]
    CreatorNotFound { address: String },

    #[error("No NFT with address '{address}'")]
    NftNotFound { address: String },

    #[error("No subdomain in request and none configured")]
    MissingSubdomain,
}

impl PageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PageError::MarketplaceNotFound { .. } => "MARKETPLACE_NOT_FOUND",
            PageError::StorefrontNotFound { .. } => "STOREFRONT_NOT_FOUND",
            PageError::CreatorNotFound { .. } => "CREATOR_NOT_FOUND",
            PageError::NftNotFound { .. } => "NFT_NOT_FOUND",
            PageError::MissingSubdomain => "MISSING_SUBDOMAIN",
        }
    }
}

// =============================================================================
// Sync Errors
// =============================================================================

/// Errors raised while mounting a query synchronizer
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No async runtime available to issue queries: {0}")]
    NoRuntime(String),
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for StorefrontError {
    fn from(err: serde_json::Error) -> Self {
        StorefrontError::Query(QueryError::Malformed(err.to_string()))
    }
}

impl From<serde_yaml::Error> for StorefrontError {
    fn from(err: serde_yaml::Error) -> Self {
        StorefrontError::Config(ConfigError::Parse(err.to_string()))
    }
}

impl From<std::io::Error> for StorefrontError {
    fn from(err: std::io::Error) -> Self {
        StorefrontError::Internal(format!("IO error: {}", err))
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for StorefrontError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StorefrontError::Query(QueryError::Malformed(err.to_string()))
        } else {
            StorefrontError::Query(QueryError::Transport(err.to_string()))
        }
    }
}

impl From<anyhow::Error> for StorefrontError {
    fn from(err: anyhow::Error) -> Self {
        StorefrontError::Internal(err.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = StorefrontError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = StorefrontError::from(PageError::MarketplaceNotFound {
            subdomain: "skellies".to_string(),
        });
        assert_eq!(err.error_code(), "MARKETPLACE_NOT_FOUND");
        assert!(err.is_not_found());

        let err = StorefrontError::from(QueryError::Rejected {
            messages: vec!["bad owner".to_string(), "bad creator".to_string()],
        });
        assert_eq!(err.error_code(), "QUERY_REJECTED");
        assert_eq!(err.to_string(), "Query rejected: bad owner; bad creator");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_yaml_error_is_config_error() {
        let yaml_err = serde_yaml::from_str::<Vec<u32>>("{not: [a list").unwrap_err();
        let err = StorefrontError::from(yaml_err);
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_json_error_is_malformed_query() {
        let json_err = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let err = StorefrontError::from(json_err);
        assert_eq!(err.error_code(), "QUERY_MALFORMED_RESPONSE");
    }
}
