//! Centralized error types for org-crawler using thiserror
//!
//! Only a few conditions abort a crawl (listing the organization, bad
//! configuration). Everything below repository granularity degrades into
//! the crawl report's error list instead of surfacing here.
use thiserror::Error;

/// Main error type for the crawler
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Failed to list repositories of '{organization}' (page {page}): {source}")]
    Listing {
        organization: String,
        page: u32,
        #[source]
        source: ApiError,
    },

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors returned by the upstream code-hosting API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors related to input validation
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Empty {0}")]
    Empty(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl From<anyhow::Error> for CrawlError {
    fn from(err: anyhow::Error) -> Self {
        CrawlError::Other(format!("{:#}", err))
    }
}

impl CrawlError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        CrawlError::Other(msg.into())
    }

    /// Check if this is a user error (bad input or configuration) vs an upstream failure
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CrawlError::Validation(_)
                | CrawlError::Config(ConfigError::InvalidValue { .. })
                | CrawlError::Config(ConfigError::MissingRequired(_))
        )
    }

    /// HTTP status of the underlying API failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            CrawlError::Listing { source, .. } | CrawlError::Api(source) => source.status(),
            _ => None,
        }
    }
}

impl ApiError {
    /// Build a status error with an empty message
    pub fn status_only(status: u16, url: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            url: url.into(),
            message: String::new(),
        }
    }

    /// HTTP status code for `Status` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ApiError::Status { url, .. }
            | ApiError::Transport { url, .. }
            | ApiError::Decode { url, .. } => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_status_display() {
        let err = ApiError::Status {
            status: 403,
            url: "https://api.github.com/repos/acme/r1/commits".to_string(),
            message: "secondary rate limit".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 403 from https://api.github.com/repos/acme/r1/commits: secondary rate limit"
        );
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_transport_error_has_no_status() {
        let err = ApiError::Transport {
            url: "https://api.github.com/orgs/acme/repos".to_string(),
            reason: "connection reset".to_string(),
        };
        assert_eq!(err.status(), None);
        assert_eq!(err.url(), "https://api.github.com/orgs/acme/repos");
    }

    #[test]
    fn test_listing_error_exposes_status() {
        let err = CrawlError::Listing {
            organization: "acme".to_string(),
            page: 2,
            source: ApiError::status_only(401, "https://api.github.com/orgs/acme/repos"),
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().starts_with("Failed to list repositories of 'acme' (page 2)"));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_is_user_error() {
        let user_err = CrawlError::Validation(ValidationError::Empty("organization".to_string()));
        assert!(user_err.is_user_error());

        let missing = CrawlError::Config(ConfigError::MissingRequired("github.token".to_string()));
        assert!(missing.is_user_error());

        let io = CrawlError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "test"));
        assert!(!io.is_user_error());
    }

    #[test]
    fn test_error_from_anyhow() {
        let err: CrawlError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, CrawlError::Other(_)));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::InvalidValue {
            key: "crawl.max_depth".to_string(),
            reason: "must be at most 32".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for 'crawl.max_depth': must be at most 32"
        );
    }
}
