//! # lumen-import: Design-Tool Variable Importer
//!
//! Converts the design tool's native collections/variables/modes into
//! canonical per-mode token sets without starving the host UI loop.
//!
//! ## Import Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Variable Import Flow                              │
//! │                                                                         │
//! │  ┌──────────────────┐   detect()    ┌──────────────────────────────┐   │
//! │  │ VariableSource   │ ────────────► │ DetectOutcome                │   │
//! │  │ (host tool API)  │               │ counts + per-collection info │   │
//! │  └────────┬─────────┘               └──────────────────────────────┘   │
//! │           │ convert_to_tokens()                                         │
//! │           ▼                                                             │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │ For each (collection, mode) unit:                                │  │
//! │  │   process variables in CHUNK_SIZE batches                        │  │
//! │  │   yield_now() between batches (UI stays responsive)              │  │
//! │  │   report (completed, total, message) after each unit             │  │
//! │  │                                                                  │  │
//! │  │ aliases  → {other.token.path}   (resolved later, by lumen-core) │  │
//! │  │ colors   → #rrggbb / #rrggbbaa  (alpha byte only when a < 1)    │  │
//! │  │ unknown  → skipped + logged     (best-effort per variable)      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Vec<TokenSet>  (one canonical tree per collection × mode)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`source`] - Native variable model and the `VariableSource` seam
//! - [`convert`] - Detection and chunked conversion
//! - [`error`] - Import error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod convert;
pub mod error;
pub mod source;

// =============================================================================
// Re-exports
// =============================================================================

pub use convert::{
    detect, CollectionInfo, DetectOutcome, ImportOutcome, ImportProgress, SkippedVariable,
    VariableImporter, CHUNK_SIZE,
};
pub use error::{ImportError, ImportResult};
pub use source::{
    NativeCollection, NativeMode, NativeValue, NativeVariable, NativeVariableType, VariableSource,
};
