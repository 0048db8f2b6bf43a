//! # Tree Diffing
//!
//! Compares a local and a remote token tree and reports the conflicts a sync
//! operation would have to reconcile.
//!
//! Records are produced only for paths present in BOTH trees; additions and
//! removals are not conflicts.

use serde::Serialize;
use serde_json::Value;

use crate::token::TokenTree;

// =============================================================================
// Conflict Records
// =============================================================================

/// How the two sides of a shared path disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// Same path, different token type.
    NameCollision,
    /// Same path and type, different concrete value.
    ValueMismatch,
    /// Same path and type, different per-mode structure.
    ModeMismatch,
}

/// One conflict between a local and a remote tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub token_name: String,
    pub local_value: Value,
    pub remote_value: Value,
    pub collection: String,
}

// =============================================================================
// Comparison
// =============================================================================

/// Compares two trees path-by-path and returns every conflict found.
pub fn compare_trees(collection: &str, local: &TokenTree, remote: &TokenTree) -> Vec<ConflictRecord> {
    let local_flat = local.flatten();
    let remote_flat = remote.flatten();

    let mut conflicts = Vec::new();

    for (path, local_token) in &local_flat {
        let Some(remote_token) = remote_flat.get(path) else {
            continue;
        };

        let kind = if local_token.token_type != remote_token.token_type {
            ConflictKind::NameCollision
        } else if local_token.value.mode_ids() != remote_token.value.mode_ids() {
            ConflictKind::ModeMismatch
        } else if local_token.value != remote_token.value {
            ConflictKind::ValueMismatch
        } else {
            continue;
        };

        conflicts.push(ConflictRecord {
            kind,
            token_name: path.clone(),
            local_value: local_token.value.to_json(),
            remote_value: remote_token.value.to_json(),
            collection: collection.to_string(),
        });
    }

    conflicts
}

// =============================================================================
// Unit Tests
// =============================================================================
