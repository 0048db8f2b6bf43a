//! # Sync Client
//!
//! Orchestrates pull/push sessions against the remote token repository.
//!
//! ## Session State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Session Phases                              │
//! │                                                                         │
//! │  PUSH:  idle ──► branching ──► writing-files ──► opening-pr ──► done   │
//! │  PULL:  idle ──► pulling ─────────────────────────────────────► done   │
//! │                                                                         │
//! │  error is reachable from any non-idle phase.                           │
//! │                                                                         │
//! │  PULL is per-file tolerant: one malformed file is skipped, the pull    │
//! │  succeeds if at least one file parses.                                 │
//! │                                                                         │
//! │  PUSH is all-or-nothing: any file-write failure aborts the session    │
//! │  (partial token state in a single PR is worse than none).             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A session is ephemeral: created per operation, discarded after
//! completion, never persisted. Only the last-sync record survives
//! (see [`crate::store`]).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use lumen_core::diff::{compare_trees, ConflictRecord};
use lumen_core::export::sanitize_filename;
use lumen_core::normalize::normalize_document;
use lumen_core::{Token, TokenSet, TokenTree, TokenValue};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::store::{LastSyncRecord, StateStore};
use crate::transport::{RemoteTransport, RemoteUser};

// =============================================================================
// Session Phases
// =============================================================================

/// Where a sync session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Pulling,
    Branching,
    WritingFiles,
    OpeningPr,
    Done,
    Error,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncPhase::Idle => write!(f, "idle"),
            SyncPhase::Pulling => write!(f, "pulling"),
            SyncPhase::Branching => write!(f, "branching"),
            SyncPhase::WritingFiles => write!(f, "writing-files"),
            SyncPhase::OpeningPr => write!(f, "opening-pr"),
            SyncPhase::Done => write!(f, "done"),
            SyncPhase::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Session Results
// =============================================================================

/// One completed push. Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSession {
    pub id: Uuid,
    pub branch_name: String,
    pub files_updated: Vec<String>,
    pub pull_request_url: String,
    pub commit_message: String,
}

/// One token document read by a pull.
#[derive(Debug, Clone, PartialEq)]
pub struct PulledDocument {
    pub filename: String,
    pub document: Value,
}

/// Everything one pull produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PullOutcome {
    pub documents: Vec<PulledDocument>,
    /// Paths of the files that were successfully read and parsed.
    pub files_found: Vec<String>,
}

/// Last-sync record plus change flags.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncStatus {
    pub last_sync: Option<LastSyncRecord>,
    pub local_changes: bool,
    pub remote_changes: bool,
}

// =============================================================================
// Sync Client
// =============================================================================

/// Pulls and pushes canonical token files against the remote repository.
///
/// One client serves one plugin instance; operations run sequentially (pull
/// OR push, never both at once against the same session).
pub struct SyncClient<T: RemoteTransport> {
    transport: T,
    config: SyncConfig,
    store: Arc<dyn StateStore>,
    phase: RwLock<SyncPhase>,
}

impl<T: RemoteTransport> SyncClient<T> {
    pub fn new(transport: T, config: SyncConfig, store: Arc<dyn StateStore>) -> SyncClient<T> {
        SyncClient {
            transport,
            config,
            store,
            phase: RwLock::new(SyncPhase::Idle),
        }
    }

    /// Current session phase.
    pub async fn phase(&self) -> SyncPhase {
        *self.phase.read().await
    }

    async fn set_phase(&self, phase: SyncPhase) {
        debug!(%phase, "Sync phase");
        *self.phase.write().await = phase;
    }

    /// Round-trips the authenticated user, distinguishing missing
    /// credentials from a missing repository.
    pub async fn check_connection(&self) -> SyncResult<RemoteUser> {
        self.transport.authenticated_user().await
    }

    // =========================================================================
    // Pull
    // =========================================================================

    /// Fetches and parses every token JSON file at the configured path.
    ///
    /// Individual file failures are logged and skipped; the pull fails only
    /// when nothing usable was found.
    pub async fn pull(&self) -> SyncResult<PullOutcome> {
        self.set_phase(SyncPhase::Pulling).await;
        let result = self.pull_inner().await;
        self.set_phase(match result {
            Ok(_) => SyncPhase::Done,
            Err(_) => SyncPhase::Error,
        })
        .await;
        result
    }

    async fn pull_inner(&self) -> SyncResult<PullOutcome> {
        let path = &self.config.repository.token_path;
        info!(%path, "Pulling token files");

        let entries = self.transport.list_directory(path, None).await?;
        let candidates: Vec<_> = entries
            .into_iter()
            .filter(|e| e.entry_type == "file" && e.name.ends_with(".json"))
            .collect();

        let mut documents = Vec::new();
        let mut files_found = Vec::new();

        for entry in &candidates {
            let file = match self.transport.get_content(&entry.path, None).await {
                Ok(file) => file,
                Err(e) => {
                    warn!(path = %entry.path, error = %e, "Skipping unreadable file");
                    continue;
                }
            };
            match serde_json::from_str::<Value>(&file.content) {
                Ok(document) => {
                    files_found.push(entry.path.clone());
                    documents.push(PulledDocument {
                        filename: entry.name.clone(),
                        document,
                    });
                }
                Err(e) => {
                    warn!(path = %entry.path, error = %e, "Skipping malformed token file");
                }
            }
        }

        if documents.is_empty() {
            return Err(SyncError::NoValidTokenFiles { path: path.clone() });
        }

        info!(found = files_found.len(), "Pull complete");
        Ok(PullOutcome {
            documents,
            files_found,
        })
    }

    // =========================================================================
    // Push
    // =========================================================================

    /// Pushes an export as one branch + one file per collection + one PR.
    ///
    /// All-or-nothing: any file-write failure aborts the whole push.
    pub async fn push(
        &self,
        sets: &[TokenSet],
        commit_message: Option<&str>,
    ) -> SyncResult<SyncSession> {
        let result = self.push_inner(sets, commit_message).await;
        self.set_phase(match result {
            Ok(_) => SyncPhase::Done,
            Err(_) => SyncPhase::Error,
        })
        .await;
        result
    }

    async fn push_inner(
        &self,
        sets: &[TokenSet],
        commit_message: Option<&str>,
    ) -> SyncResult<SyncSession> {
        if sets.is_empty() {
            return Err(SyncError::InvalidConfig(
                "export contains no token sets".to_string(),
            ));
        }

        let repository = &self.config.repository;
        let message = commit_message
            .map(str::to_string)
            .unwrap_or_else(|| "Update design tokens".to_string());
        let files = export_files(sets)?;

        // Branch from the configured base.
        self.set_phase(SyncPhase::Branching).await;
        let base_sha = with_retry("branch head", || {
            self.transport.branch_head(&repository.base_branch)
        })
        .await?;
        let branch = branch_name(Utc::now());
        with_retry("create branch", || {
            self.transport.create_ref(&branch, &base_sha)
        })
        .await?;
        info!(%branch, base = %repository.base_branch, "Branch created");

        // One file per collection, each write carrying the existing revision
        // marker so concurrent edits are not silently overwritten.
        self.set_phase(SyncPhase::WritingFiles).await;
        let mut files_updated = Vec::with_capacity(files.len());
        for (filename, content) in &files {
            let path = format!("{}/{}", repository.token_path, filename);

            let existing_sha = match self.transport.get_content(&path, Some(&branch)).await {
                Ok(file) => Some(file.sha),
                Err(SyncError::NotFound(_)) => None,
                Err(e) => return Err(e),
            };

            with_retry("write file", || {
                self.transport.create_or_update_file(
                    &path,
                    content,
                    &message,
                    &branch,
                    existing_sha.as_deref(),
                )
            })
            .await?;
            files_updated.push(path);
        }

        // Open the pull request with the export summary.
        self.set_phase(SyncPhase::OpeningPr).await;
        let body = pull_request_body(sets, &files_updated);
        let pr = with_retry("open pull request", || {
            self.transport
                .create_pull_request(&branch, &repository.base_branch, &message, &body)
        })
        .await?;
        info!(pr = %pr.html_url, files = files_updated.len(), "Push complete");

        // Record the push; a failed record never fails a completed push.
        let record = LastSyncRecord {
            timestamp: Utc::now(),
            repository: repository.full_name(),
            content_digest: export_digest(&files),
            remote_head: Some(base_sha),
        };
        if let Err(e) = record.save(self.store.as_ref()) {
            warn!(error = %e, "Failed to persist last-sync record");
        }

        Ok(SyncSession {
            id: Uuid::new_v4(),
            branch_name: branch,
            files_updated,
            pull_request_url: pr.html_url,
            commit_message: message,
        })
    }

    // =========================================================================
    // Conflicts
    // =========================================================================

    /// Normalizes a pulled remote document and reports the conflicts a local
    /// set has against it.
    pub fn conflicts(
        &self,
        local: &TokenSet,
        remote_document: &Value,
    ) -> SyncResult<Vec<ConflictRecord>> {
        let remote_tree = normalize_document(remote_document, None)
            .map_err(|e| SyncError::Serialization(e.to_string()))?;
        Ok(compare_trees(&local.collection, &local.tree, &remote_tree))
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Last-sync record plus change flags.
    ///
    /// Local changes: the current export's content digest differs from the
    /// digest recorded at last push. Remote changes: the base branch head
    /// moved since last push.
    pub async fn sync_status(&self, sets: &[TokenSet]) -> SyncResult<SyncStatus> {
        let Some(record) = LastSyncRecord::load(self.store.as_ref())? else {
            return Ok(SyncStatus {
                last_sync: None,
                local_changes: !sets.is_empty(),
                remote_changes: false,
            });
        };

        let digest = export_digest(&export_files(sets)?);
        let local_changes = digest != record.content_digest;

        let remote_changes = match &record.remote_head {
            Some(recorded) => {
                match self
                    .transport
                    .branch_head(&self.config.repository.base_branch)
                    .await
                {
                    Ok(head) => &head != recorded,
                    Err(e) => {
                        warn!(error = %e, "Could not check remote head");
                        false
                    }
                }
            }
            None => false,
        };

        Ok(SyncStatus {
            last_sync: Some(record),
            local_changes,
            remote_changes,
        })
    }
}

// =============================================================================
// Export Assembly
// =============================================================================

/// Deterministic branch name derived from the push timestamp.
fn branch_name(now: DateTime<Utc>) -> String {
    format!("tokens/sync-{}", now.format("%Y%m%d-%H%M%S"))
}

/// Builds `(filename, content)` pairs: one file per collection, modes merged
/// into per-mode values.
fn export_files(sets: &[TokenSet]) -> SyncResult<Vec<(String, String)>> {
    let mut by_collection: BTreeMap<&str, Vec<&TokenSet>> = BTreeMap::new();
    for set in sets {
        by_collection
            .entry(set.collection.as_str())
            .or_default()
            .push(set);
    }

    let mut files = Vec::with_capacity(by_collection.len());
    for (collection, group) in by_collection {
        let tree = if group.len() == 1 {
            group[0].tree.clone()
        } else {
            merge_collection_sets(&group)?
        };
        let filename = sanitize_filename(&format!("{}.tokens.json", collection));
        let content = serde_json::to_string_pretty(&tree.to_canonical_json())?;
        files.push((filename, content));
    }
    Ok(files)
}

/// Merges one collection's per-mode trees into a single tree whose tokens
/// carry per-mode values keyed by mode name.
fn merge_collection_sets(group: &[&TokenSet]) -> SyncResult<TokenTree> {
    let mut merged: BTreeMap<String, Token> = BTreeMap::new();

    for set in group {
        for (path, token) in set.tree.flatten() {
            let entry = merged.entry(path).or_insert_with(|| {
                let mut shell = token.clone();
                shell.value = TokenValue::PerMode(BTreeMap::new());
                shell
            });
            if let TokenValue::PerMode(map) = &mut entry.value {
                map.insert(set.mode.clone(), token.value.to_json());
            }
        }
    }

    TokenTree::from_flat(merged).map_err(|e| SyncError::Serialization(e.to_string()))
}

/// sha256 digest over the export, for change detection.
fn export_digest(files: &[(String, String)]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    for (filename, content) in files {
        hasher.update(filename.as_bytes());
        hasher.update([0u8]);
        hasher.update(content.as_bytes());
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Generates the pull-request body from the export summary.
fn pull_request_body(sets: &[TokenSet], files: &[String]) -> String {
    let collections: BTreeMap<&str, (usize, usize)> =
        sets.iter().fold(BTreeMap::new(), |mut acc, set| {
            let entry = acc.entry(set.collection.as_str()).or_insert((0, 0));
            entry.0 += set.token_count();
            entry.1 += 1;
            acc
        });
    let total_tokens: usize = sets.iter().map(TokenSet::token_count).sum();

    let mut body = String::new();
    body.push_str("## Design Token Update\n\n");
    body.push_str(&format!("Collections Updated: {}\n", collections.len()));
    body.push_str(&format!("Total Tokens: {}\n\n", total_tokens));

    body.push_str("### Collections\n");
    for (name, (tokens, modes)) in collections {
        body.push_str(&format!(
            "- {}: {} tokens across {} mode{}\n",
            name,
            tokens,
            modes,
            if modes == 1 { "" } else { "s" }
        ));
    }

    body.push_str("\n### Files\n");
    for file in files {
        body.push_str(&format!("- {}\n", file));
    }

    body
}

// =============================================================================
// Retry Helper
// =============================================================================

/// Retries a transport call with exponential backoff while the failure is
/// transient. Non-retryable errors surface immediately.
async fn with_retry<T, F, Fut>(operation: &str, mut call: F) -> SyncResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = SyncResult<T>>,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_millis(250),
        max_interval: Duration::from_secs(5),
        max_elapsed_time: Some(Duration::from_secs(20)),
        ..Default::default()
    };

    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => match backoff.next_backoff() {
                Some(delay) => {
                    warn!(%operation, error = %err, ?delay, "Retrying transport call");
                    tokio::time::sleep(delay).await;
                }
                None => return Err(err),
            },
            Err(err) => return Err(err),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
