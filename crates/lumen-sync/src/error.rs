//! # Sync Error Types
//!
//! Error types for remote sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Remote        │  │     Content             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Unauthorized   │  │  Serialization          │ │
//! │  │  ConfigLoad     │  │  NotFound       │  │  Encoding               │ │
//! │  │  ConfigSave     │  │  Transport      │  │  NoValidTokenFiles      │ │
//! │  │  InvalidUrl     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Unauthorized and NotFound are DISTINCT so callers can render          │
//! │  "no write access" vs "repository not found".                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all remote-sync failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Invalid API base URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// The token has no access to the resource (HTTP 401/403).
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// The resource does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other transport-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    // =========================================================================
    // Content Errors
    // =========================================================================
    /// A pull found nothing usable at the configured path.
    #[error("No valid token files found at '{path}'")]
    NoValidTokenFiles { path: String },

    /// Failed to (de)serialize a payload.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Failed to decode transport content (base64 / UTF-8).
    #[error("Content encoding error: {0}")]
    Encoding(String),

    // =========================================================================
    // State Errors
    // =========================================================================
    /// The persisted-state store failed.
    #[error("State store error: {0}")]
    StateStore(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

impl From<base64::DecodeError> for SyncError {
    fn from(err: base64::DecodeError) -> Self {
        SyncError::Encoding(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl SyncError {
    /// Returns true if the operation can be retried.
    ///
    /// Only transport-level failures are transient; authorization, missing
    /// resources, and malformed content never heal by retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }

    /// Returns true if this error indicates missing or insufficient
    /// credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SyncError::Unauthorized(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
                | SyncError::InvalidUrl(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(SyncError::Transport("connection reset".into()).is_retryable());

        assert!(!SyncError::Unauthorized("no write access".into()).is_retryable());
        assert!(!SyncError::NotFound("repo".into()).is_retryable());
        assert!(!SyncError::InvalidConfig("bad".into()).is_retryable());
    }

    #[test]
    fn test_auth_and_not_found_are_distinct() {
        let auth = SyncError::Unauthorized("tokens/".into());
        let missing = SyncError::NotFound("tokens/".into());
        assert!(auth.is_auth_error());
        assert!(!missing.is_auth_error());
        assert!(auth.to_string().starts_with("Not authorized"));
        assert!(missing.to_string().starts_with("Not found"));
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::NoValidTokenFiles {
            path: "design/tokens".into(),
        };
        assert!(err.to_string().contains("design/tokens"));
    }
}
