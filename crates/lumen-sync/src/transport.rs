//! # Remote Repository Transport
//!
//! The narrow seam between the sync client and the version-controlled token
//! repository, plus its GitHub REST implementation.
//!
//! ## Boundary Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       RemoteTransport                                   │
//! │                                                                         │
//! │  get_content(path, ref?)          read one file (+ revision sha)       │
//! │  list_directory(path, ref?)       enumerate a directory                │
//! │  branch_head(branch)              resolve a branch to its head sha     │
//! │  create_ref(branch, from_sha)     create a branch (idempotent)         │
//! │  create_or_update_file(...)       write one file on a branch           │
//! │  create_pull_request(...)         open the PR                          │
//! │  authenticated_user()             connectivity / permission probe      │
//! │                                                                         │
//! │  Content crosses this boundary as UTF-8 JSON, base64-encoded per the   │
//! │  transport's convention. HTTP status mapping:                          │
//! │    401 / 403 → Unauthorized      404 → NotFound      else → Transport  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};

/// User-Agent sent with every request; GitHub rejects anonymous clients.
const USER_AGENT: &str = "lumen-tokens";

// =============================================================================
// Transport Types
// =============================================================================

/// One file read from the remote, content already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    /// Revision marker passed back on update to avoid lost updates.
    pub sha: String,
    pub content: String,
}

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    /// `"file"` or `"dir"`.
    pub entry_type: String,
}

/// Result of a file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommit {
    pub path: String,
    /// New blob sha of the written file.
    pub sha: Option<String>,
}

/// A created pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

/// The authenticated remote identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    pub login: String,
}

// =============================================================================
// Transport Seam
// =============================================================================

/// Read/write access to the remote token repository.
///
/// Network timeouts and low-level retries are this layer's concern; the
/// sync client only orchestrates the call sequence.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    async fn get_content(&self, path: &str, reference: Option<&str>) -> SyncResult<RemoteFile>;

    async fn list_directory(
        &self,
        path: &str,
        reference: Option<&str>,
    ) -> SyncResult<Vec<RemoteEntry>>;

    async fn branch_head(&self, branch: &str) -> SyncResult<String>;

    async fn create_ref(&self, branch: &str, from_sha: &str) -> SyncResult<()>;

    async fn create_or_update_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        branch: &str,
        sha: Option<&str>,
    ) -> SyncResult<FileCommit>;

    async fn create_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> SyncResult<PullRequest>;

    async fn authenticated_user(&self) -> SyncResult<RemoteUser>;
}

// =============================================================================
// Wire Payloads
// =============================================================================

#[derive(Debug, Serialize)]
struct BranchPayload {
    #[serde(rename = "ref")]
    ref_name: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct FilePayload {
    message: String,
    content: String,
    branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

#[derive(Debug, Serialize)]
struct PullRequestPayload {
    title: String,
    body: String,
    head: String,
    base: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    sha: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntryResponse {
    name: String,
    path: String,
    sha: String,
    #[serde(rename = "type")]
    entry_type: String,
}

#[derive(Debug, Deserialize)]
struct FileCommitResponse {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    number: u64,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

// =============================================================================
// GitHub Implementation
// =============================================================================

/// `RemoteTransport` over the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubTransport {
    client: Client,
    api_base: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubTransport {
    pub fn new(config: &SyncConfig) -> SyncResult<GitHubTransport> {
        config.validate()?;
        Ok(GitHubTransport {
            client: Client::new(),
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            owner: config.repository.owner.clone(),
            repo: config.repository.name.clone(),
            token: config.auth.token.clone(),
        })
    }

    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, tail
        )
    }

    fn headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.v3+json")
    }

    /// Checks a response status, draining the body into the error context on
    /// failure.
    async fn check(
        response: reqwest::Response,
        context: &str,
    ) -> SyncResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_for_status(status, context, &body))
    }
}

/// Maps an HTTP failure status onto the distinguished error kinds.
fn error_for_status(status: StatusCode, context: &str, body: &str) -> SyncError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SyncError::Unauthorized(context.to_string())
        }
        StatusCode::NOT_FOUND => SyncError::NotFound(context.to_string()),
        _ => SyncError::Transport(format!("{}: {} - {}", context, status, body)),
    }
}

/// Decodes transport content: base64 with embedded newlines, UTF-8 inside.
fn decode_content(raw: &str) -> SyncResult<String> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64.decode(cleaned)?;
    String::from_utf8(bytes).map_err(|e| SyncError::Encoding(e.to_string()))
}

#[async_trait]
impl RemoteTransport for GitHubTransport {
    async fn get_content(&self, path: &str, reference: Option<&str>) -> SyncResult<RemoteFile> {
        let mut url = self.repo_url(&format!("contents/{}", path));
        if let Some(reference) = reference {
            url = format!("{}?ref={}", url, reference);
        }
        debug!(%path, "Fetching remote content");

        let response = self.headers(self.client.get(&url)).send().await?;
        let response = Self::check(response, &format!("file '{}'", path)).await?;
        let parsed = response.json::<ContentResponse>().await?;

        let encoded = parsed
            .content
            .ok_or_else(|| SyncError::Transport(format!("'{}' has no content (directory?)", path)))?;

        Ok(RemoteFile {
            path: path.to_string(),
            sha: parsed.sha,
            content: decode_content(&encoded)?,
        })
    }

    async fn list_directory(
        &self,
        path: &str,
        reference: Option<&str>,
    ) -> SyncResult<Vec<RemoteEntry>> {
        let mut url = self.repo_url(&format!("contents/{}", path));
        if let Some(reference) = reference {
            url = format!("{}?ref={}", url, reference);
        }
        debug!(%path, "Listing remote directory");

        let response = self.headers(self.client.get(&url)).send().await?;
        let response = Self::check(response, &format!("directory '{}'", path)).await?;
        let entries = response.json::<Vec<EntryResponse>>().await?;

        Ok(entries
            .into_iter()
            .map(|e| RemoteEntry {
                name: e.name,
                path: e.path,
                sha: e.sha,
                entry_type: e.entry_type,
            })
            .collect())
    }

    async fn branch_head(&self, branch: &str) -> SyncResult<String> {
        let url = self.repo_url(&format!("git/ref/heads/{}", branch));

        let response = self.headers(self.client.get(&url)).send().await?;
        let response = Self::check(response, &format!("branch '{}'", branch)).await?;
        let parsed = response.json::<RefResponse>().await?;
        Ok(parsed.object.sha)
    }

    async fn create_ref(&self, branch: &str, from_sha: &str) -> SyncResult<()> {
        let url = self.repo_url("git/refs");
        let payload = BranchPayload {
            ref_name: format!("refs/heads/{}", branch),
            sha: from_sha.to_string(),
        };
        debug!(%branch, %from_sha, "Creating branch");

        let response = self
            .headers(self.client.post(&url))
            .json(&payload)
            .send()
            .await?;

        // 422 means the ref already exists; branch creation is idempotent.
        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            warn!(%branch, "Branch already exists, reusing it");
            return Ok(());
        }
        Self::check(response, &format!("branch '{}'", branch)).await?;
        Ok(())
    }

    async fn create_or_update_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        branch: &str,
        sha: Option<&str>,
    ) -> SyncResult<FileCommit> {
        let url = self.repo_url(&format!("contents/{}", path));
        let payload = FilePayload {
            message: message.to_string(),
            content: BASE64.encode(content.as_bytes()),
            branch: branch.to_string(),
            sha: sha.map(str::to_string),
        };
        debug!(%path, %branch, updating = sha.is_some(), "Writing remote file");

        let response = self
            .headers(self.client.put(&url))
            .json(&payload)
            .send()
            .await?;
        let response = Self::check(response, &format!("file '{}'", path)).await?;
        let parsed = response.json::<FileCommitResponse>().await?;

        Ok(FileCommit {
            path: path.to_string(),
            sha: parsed.content.map(|c| c.sha),
        })
    }

    async fn create_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> SyncResult<PullRequest> {
        let url = self.repo_url("pulls");
        let payload = PullRequestPayload {
            title: title.to_string(),
            body: body.to_string(),
            head: head.to_string(),
            base: base.to_string(),
        };
        debug!(%head, %base, "Opening pull request");

        let response = self
            .headers(self.client.post(&url))
            .json(&payload)
            .send()
            .await?;
        let response = Self::check(response, "pull request").await?;
        let parsed = response.json::<PullRequestResponse>().await?;

        Ok(PullRequest {
            number: parsed.number,
            html_url: parsed.html_url,
        })
    }

    async fn authenticated_user(&self) -> SyncResult<RemoteUser> {
        let url = format!("{}/user", self.api_base);

        let response = self.headers(self.client.get(&url)).send().await?;
        let response = Self::check(response, "authenticated user").await?;
        let parsed = response.json::<UserResponse>().await?;
        Ok(RemoteUser {
            login: parsed.login,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
