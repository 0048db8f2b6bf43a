//! # Import Error Types
//!
//! Whole-operation failures at the design-tool boundary. Per-variable
//! conversion problems are NOT errors - they become skip records on the
//! outcome, because import is best-effort per variable.

use thiserror::Error;

/// Result type alias for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Import failures that abort the whole conversion.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The host variable API failed or is unavailable.
    #[error("Variable source unavailable: {0}")]
    Source(String),

    /// A requested collection id does not exist.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ImportError::UnknownCollection("VariableCollectionId:1:2".to_string());
        assert_eq!(err.to_string(), "Unknown collection: VariableCollectionId:1:2");
    }
}
