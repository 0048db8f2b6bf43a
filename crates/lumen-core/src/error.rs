//! # Error Types
//!
//! Pipeline error types for lumen-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lumen-core errors (this file)                                         │
//! │  └── TokenError       - Whole-operation failures (parse, format)       │
//! │                                                                         │
//! │  lumen-core issues (validation module)                                 │
//! │  └── ValidationIssue  - Collected per-token findings (never thrown)    │
//! │                                                                         │
//! │  lumen-import errors (separate crate)                                  │
//! │  └── ImportError      - Design-tool boundary failures                  │
//! │                                                                         │
//! │  lumen-sync errors (separate crate)                                    │
//! │  └── SyncError        - Remote repository failures                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (path, target, dialect)
//! 3. Errors are enum variants, never String
//! 4. Graph findings (missing/circular references) are COLLECTED into a
//!    report, not thrown - only whole-operation failures live here

use thiserror::Error;

// =============================================================================
// Token Error
// =============================================================================

/// Whole-operation pipeline failures.
///
/// A `TokenError` aborts the operation that produced it. Per-token findings
/// (missing references, naming problems) are collected into a
/// [`crate::validation::ValidationReport`] instead.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Input document is not valid JSON.
    #[error("Failed to parse token document: {reason}")]
    Parse { reason: String },

    /// No known dialect matched the document shape.
    ///
    /// Surfaced instead of silently producing an empty tree so callers can
    /// tell "empty token set" apart from "unsupported format".
    #[error("Unrecognized token format: no dialect matched the document")]
    UnrecognizedFormat,

    /// A token path collides with an existing group or token.
    #[error("Token path '{path}' collides with an existing entry")]
    PathCollision { path: String },

    /// A path segment was empty after normalization.
    #[error("Empty path segment in '{path}'")]
    EmptyPathSegment { path: String },
}

impl From<serde_json::Error> for TokenError {
    fn from(err: serde_json::Error) -> Self {
        TokenError::Parse {
            reason: err.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with TokenError.
pub type CoreResult<T> = Result<T, TokenError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TokenError::Parse {
            reason: "unexpected end of input".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse token document: unexpected end of input"
        );

        let err = TokenError::PathCollision {
            path: "color.primary".to_string(),
        };
        assert!(err.to_string().contains("color.primary"));
    }

    #[test]
    fn test_serde_error_converts() {
        let bad: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: TokenError = bad.unwrap_err().into();
        assert!(matches!(err, TokenError::Parse { .. }));
    }
}
