//! # lumen-core: Pure Token Pipeline for Lumen
//!
//! This crate is the **heart** of the Lumen token pipeline. It contains the
//! canonical token model and every pure transformation as functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Lumen Token Pipeline                               │
//! │                                                                         │
//! │  ┌─────────────────┐                      ┌──────────────────────────┐ │
//! │  │  lumen-import   │                      │       lumen-sync         │ │
//! │  │  design-tool    │                      │  GitHub pull / push / PR │ │
//! │  │  variables      │                      │                          │ │
//! │  └────────┬────────┘                      └────────────┬─────────────┘ │
//! │           │ produces                          consumes │               │
//! │  ┌────────▼──────────────────────────────────────────▼───────────────┐ │
//! │  │                ★ lumen-core (THIS CRATE) ★                        │ │
//! │  │                                                                   │ │
//! │  │  ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌──────────────────┐ │ │
//! │  │  │   token   │ │ normalize │ │  resolve  │ │    validation    │ │ │
//! │  │  │ TokenTree │ │ dialects  │ │ {alias}   │ │ report + stats   │ │ │
//! │  │  └───────────┘ └───────────┘ └───────────┘ └──────────────────┘ │ │
//! │  │  ┌───────────┐ ┌───────────┐ ┌───────────┐                      │ │
//! │  │  │ bindings  │ │   diff    │ │  export   │                      │ │
//! │  │  │ CSS vars  │ │ conflicts │ │ downloads │                      │ │
//! │  │  └───────────┘ └───────────┘ └───────────┘                      │ │
//! │  │                                                                   │ │
//! │  │   NO I/O • NO NETWORK • NO DESIGN-TOOL API • PURE FUNCTIONS      │ │
//! │  └───────────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`token`] - Canonical token model (Token, TokenTree, Collection, Mode)
//! - [`error`] - Pipeline error types
//! - [`normalize`] - Dialect detection and canonical normalization
//! - [`resolve`] - Reference graph resolution
//! - [`validation`] - Validation engine and report
//! - [`bindings`] - CSS-variable and utility-class generation
//! - [`diff`] - Local/remote tree comparison
//! - [`export`] - Downloadable file generation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every transformation is deterministic
//! 2. **No I/O**: Network, file system, and host API access are FORBIDDEN here
//! 3. **New Trees**: Transformations return new trees, inputs are never mutated
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use lumen_core::normalize::{normalize_document, parse_document};
//! use lumen_core::resolve::resolve;
//! use lumen_core::validation::validate;
//!
//! let doc = parse_document(
//!     r##"{"color": {"primary": {"value": "#0066FF", "type": "color"}}}"##,
//! ).unwrap();
//! let tree = normalize_document(&doc, None).unwrap();
//! let resolution = resolve(&tree);
//! let report = validate(&tree, Some(&resolution));
//! assert!(report.valid);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bindings;
pub mod diff;
pub mod error;
pub mod export;
pub mod normalize;
pub mod resolve;
pub mod token;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use lumen_core::TokenTree` instead of
// `use lumen_core::token::TokenTree`

pub use error::{CoreResult, TokenError};
pub use token::{
    Collection, Mode, Token, TokenNode, TokenPath, TokenSet, TokenTree, TokenType, TokenValue,
};
pub use validation::{ValidationReport, ValidationStats};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Separator between path segments in the flattened representation
/// and inside `{...}` reference expressions.
pub const PATH_SEPARATOR: char = '.';

/// Maximum reference chain length tolerated by the resolver.
///
/// Chains longer than this are reported as circular-dependency-class issues
/// instead of being followed further.
pub const MAX_REFERENCE_DEPTH: usize = 50;

/// Extension namespace under which Lumen records side-channel metadata
/// (extracted units, description annotations).
pub const EXTENSION_NAMESPACE: &str = "lumen";
