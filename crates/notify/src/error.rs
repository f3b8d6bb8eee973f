//! Error types for Mattermost delivery and configuration.

use thiserror::Error;

/// Errors that can occur while delivering a notification to one destination.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The configured endpoint is not an absolute URL
    #[error("invalid endpoint URL {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// HTTP client could not be constructed
    #[error("failed to build HTTP transport: {0}")]
    Transport(String),

    /// HTTP request failed (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook answered with something other than 200
    #[error("Mattermost returned {status}: {body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while assembling a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is absent
    #[error("missing setting: {0}")]
    Missing(&'static str),

    /// A setting has a value that cannot be used
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    /// A no-proxy glob could not be compiled
    #[error("invalid no-proxy pattern {glob:?}: {source}")]
    BypassPattern {
        glob: String,
        #[source]
        source: regex::Error,
    },
}
