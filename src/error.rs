//! Error types for cache operations
//!
//! This module defines custom error types for the dbcache library. Errors
//! are cloneable so a single failure can be delivered verbatim to every
//! caller waiting on the same in-flight computation.

use thiserror::Error;

/// Main error type for cache operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The wrapped read operation failed - the collaborator's data source
    /// is unreachable or rejected the query. Never cached.
    #[error("read operation failed: {0}")]
    Read(String),

    /// Internal cache invariant violation (index/store desync). Should be
    /// unreachable; logged at error level when observed.
    #[error("cache invariant violated: {0}")]
    Compute(String),

    /// Key or value serialization failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

impl From<String> for CacheError {
    fn from(s: String) -> Self {
        CacheError::Read(s)
    }
}

impl From<&str> for CacheError {
    fn from(s: &str) -> Self {
        CacheError::Read(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CacheError::Read("database unreachable".to_string());
        assert_eq!(
            error.to_string(),
            "read operation failed: database unreachable"
        );

        let error = CacheError::Serialization("bad json".to_string());
        assert!(error.to_string().contains("bad json"));
    }

    #[test]
    fn test_error_conversion() {
        let error: CacheError = "query timed out".into();
        assert!(matches!(error, CacheError::Read(_)));

        let error: CacheError = "query timed out".to_string().into();
        assert!(matches!(error, CacheError::Read(_)));
    }

    #[test]
    fn test_error_clone_equality() {
        let error = CacheError::Read("transient".to_string());
        assert_eq!(error.clone(), error);
    }
}
