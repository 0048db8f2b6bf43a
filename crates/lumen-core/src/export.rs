//! # File Export Surface
//!
//! Produces `{filename, content}` pairs for manual download of canonical
//! token sets. Filenames are sanitized to `[a-z0-9.-]` so they survive every
//! host download path.

use serde::Serialize;

use crate::error::CoreResult;
use crate::token::TokenSet;

// =============================================================================
// Download Files
// =============================================================================

/// One downloadable token file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadFile {
    pub filename: String,
    pub content: String,
}

/// Restricts a filename to `[a-z0-9.-]`: lowercases, maps anything else to a
/// dash, and collapses runs.
pub fn sanitize_filename(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '.' || ch == '-' {
            out.push(ch);
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Generates one pretty-printed canonical JSON file per token set.
///
/// Filenames follow `{collection}.{mode}.tokens.json`, sanitized.
pub fn generate_downloadable_files(sets: &[TokenSet]) -> CoreResult<Vec<DownloadFile>> {
    let mut files = Vec::with_capacity(sets.len());
    for set in sets {
        let filename = sanitize_filename(&format!(
            "{}.{}.tokens.json",
            set.collection, set.mode
        ));
        let content = serde_json::to_string_pretty(&set.tree.to_canonical_json())?;
        files.push(DownloadFile { filename, content });
    }
    Ok(files)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenPath, TokenTree, TokenType, TokenValue};
    use serde_json::json;

    fn set(collection: &str, mode: &str) -> TokenSet {
        let mut tree = TokenTree::new();
        tree.insert(Token::new(
            TokenPath::parse("color.primary").unwrap(),
            TokenType::Color,
            TokenValue::Single(json!("#0066ff")),
        ))
        .unwrap();
        TokenSet {
            collection: collection.to_string(),
            mode: mode.to_string(),
            tree,
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Core Tokens.json"), "core-tokens.json");
        assert_eq!(sanitize_filename("brand/Light Mode"), "brand-light-mode");
        assert_eq!(sanitize_filename("ok-1.2.json"), "ok-1.2.json");
    }

    #[test]
    fn test_generate_files() {
        let files =
            generate_downloadable_files(&[set("Core Tokens", "Light"), set("brand", "dark")])
                .unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "core-tokens.light.tokens.json");
        assert_eq!(files[1].filename, "brand.dark.tokens.json");
        assert!(files[0].content.contains("\"$value\": \"#0066ff\""));
    }
}
