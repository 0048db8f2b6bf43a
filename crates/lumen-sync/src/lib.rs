//! # lumen-sync: Remote Token Repository Sync
//!
//! This crate synchronizes canonical token sets with a version-controlled
//! remote repository via branch / pull-request semantics.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Client Architecture                          │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    SyncClient (Orchestrator)                     │  │
//! │  │                                                                  │  │
//! │  │  pull()        list → fetch → parse, per-file tolerant          │  │
//! │  │  push()        branch → write files → open PR, all-or-nothing   │  │
//! │  │  sync_status() last-sync record + content-digest change flags   │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ RemoteTransport│  │  SyncConfig    │  │  StateStore            │    │
//! │  │                │  │                │  │                        │    │
//! │  │ GitHub REST    │  │ TOML file +    │  │ {timestamp, repo,      │    │
//! │  │ over reqwest,  │  │ env overrides  │  │  digest} record only   │    │
//! │  │ base64 content │  │                │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  FAILURE SEMANTICS:                                                    │
//! │  • Unauthorized vs NotFound are distinct, user-facing error kinds     │
//! │  • pull succeeds if at least one file parses                          │
//! │  • push aborts entirely on any single file-write failure              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`client`] - `SyncClient` pull/push/status orchestration
//! - [`config`] - Remote repository configuration
//! - [`error`] - Sync error types
//! - [`store`] - Persisted last-sync state seam
//! - [`transport`] - `RemoteTransport` trait and GitHub implementation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lumen_sync::{FileStore, GitHubTransport, SyncClient, SyncConfig};
//!
//! let config = SyncConfig::load_or_default(None)?;
//! let transport = GitHubTransport::new(&config)?;
//! let store = Arc::new(FileStore::default_location().expect("config dir"));
//!
//! let client = SyncClient::new(transport, config, store);
//! let outcome = client.pull().await?;
//! println!("Pulled {} token files", outcome.files_found.len());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod config;
pub mod error;
pub mod store;
pub mod transport;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{
    PullOutcome, PulledDocument, SyncClient, SyncPhase, SyncSession, SyncStatus,
};
pub use config::{AuthConfig, RepositoryConfig, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use store::{FileStore, LastSyncRecord, MemoryStore, StateStore};
pub use transport::{
    FileCommit, GitHubTransport, PullRequest, RemoteEntry, RemoteFile, RemoteTransport, RemoteUser,
};
