//! # Sync Configuration
//!
//! Configuration for the remote token repository.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LUMEN_GITHUB_TOKEN=ghp_...                                          │
//! │     LUMEN_SYNC_REPO=acme/design-tokens                                  │
//! │     LUMEN_SYNC_BRANCH=main                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/lumen-tokens/sync.toml (Linux)                           │
//! │     ~/Library/Application Support/com.lumen.tokens/sync.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     base branch "main", token path "tokens"                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! api_base_url = "https://api.github.com"
//!
//! [repository]
//! owner = "acme"
//! name = "design-tokens"
//! base_branch = "main"
//! token_path = "tokens"
//!
//! [auth]
//! token = "ghp_..."
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Configuration Types
// =============================================================================

/// The remote repository holding the canonical token files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,

    /// Branch pushes branch from and pull requests target.
    #[serde(default = "default_base_branch")]
    pub base_branch: String,

    /// Directory inside the repository holding the token JSON files.
    #[serde(default = "default_token_path")]
    pub token_path: String,
}

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_token_path() -> String {
    "tokens".to_string()
}

impl RepositoryConfig {
    /// `owner/name` form, used in last-sync records and log lines.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Credentials for the remote transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Bearer token with content + pull-request scopes.
    pub token: String,
}

/// Complete sync configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// REST API base URL. Points at GitHub by default; override for
    /// enterprise hosts.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    pub repository: RepositoryConfig,

    pub auth: AuthConfig,
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            api_base_url: default_api_base_url(),
            repository: RepositoryConfig {
                owner: String::new(),
                name: String::new(),
                base_branch: default_base_branch(),
                token_path: default_token_path(),
            },
            auth: AuthConfig {
                token: String::new(),
            },
        }
    }
}

// =============================================================================
// Loading and Saving
// =============================================================================

impl SyncConfig {
    /// Platform config file location (`<config dir>/sync.toml`).
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lumen", "lumen-tokens")
            .map(|dirs| dirs.config_dir().join("sync.toml"))
    }

    /// Loads from a TOML file, then applies environment overrides.
    ///
    /// A missing file is not an error - defaults plus environment variables
    /// still make a usable configuration for CI use.
    pub fn load_or_default(path: Option<&Path>) -> SyncResult<SyncConfig> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => SyncConfig::default_path(),
        };

        let mut config = match resolved {
            Some(ref p) if p.exists() => {
                debug!(path = %p.display(), "Loading sync config");
                let raw = std::fs::read_to_string(p)?;
                toml::from_str(&raw)?
            }
            _ => SyncConfig::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Saves to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> SyncResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))
    }

    /// Applies `LUMEN_*` environment overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("LUMEN_GITHUB_TOKEN") {
            if !token.is_empty() {
                self.auth.token = token;
            }
        }
        if let Ok(repo) = std::env::var("LUMEN_SYNC_REPO") {
            if let Some((owner, name)) = parse_repo(&repo) {
                self.repository.owner = owner;
                self.repository.name = name;
            }
        }
        if let Ok(branch) = std::env::var("LUMEN_SYNC_BRANCH") {
            if !branch.is_empty() {
                self.repository.base_branch = branch;
            }
        }
    }

    /// Checks the configuration is complete enough to reach the remote.
    pub fn validate(&self) -> SyncResult<()> {
        if self.repository.owner.trim().is_empty() || self.repository.name.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "repository owner and name are required".to_string(),
            ));
        }
        if self.auth.token.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "an access token is required".to_string(),
            ));
        }
        url::Url::parse(&self.api_base_url)?;
        Ok(())
    }
}

/// Parses an `owner/name` repository string.
pub fn parse_repo(raw: &str) -> Option<(String, String)> {
    let (owner, name) = raw.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner.to_string(), name.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.api_base_url, "https://api.github.com");
        assert_eq!(config.repository.base_branch, "main");
        assert_eq!(config.repository.token_path, "tokens");
    }

    #[test]
    fn test_parse_repo() {
        assert_eq!(
            parse_repo("acme/design-tokens"),
            Some(("acme".to_string(), "design-tokens".to_string()))
        );
        assert_eq!(parse_repo("acme"), None);
        assert_eq!(parse_repo("a/b/c"), None);
        assert_eq!(parse_repo("/tokens"), None);
    }

    #[test]
    fn test_validate() {
        let mut config = SyncConfig::default();
        assert!(matches!(
            config.validate(),
            Err(SyncError::InvalidConfig(_))
        ));

        config.repository.owner = "acme".to_string();
        config.repository.name = "design-tokens".to_string();
        config.auth.token = "ghp_test".to_string();
        assert!(config.validate().is_ok());

        config.api_base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(SyncError::InvalidUrl(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = SyncConfig::default();
        config.repository.owner = "acme".to_string();
        config.repository.name = "design-tokens".to_string();
        config.auth.token = "ghp_test".to_string();

        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: SyncConfig = toml::from_str(&raw).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let raw = r#"
            [repository]
            owner = "acme"
            name = "design-tokens"

            [auth]
            token = "ghp_test"
        "#;
        let parsed: SyncConfig = toml::from_str(raw).unwrap();
        assert_eq!(parsed.repository.base_branch, "main");
        assert_eq!(parsed.repository.token_path, "tokens");
        assert_eq!(parsed.api_base_url, "https://api.github.com");
    }
}
