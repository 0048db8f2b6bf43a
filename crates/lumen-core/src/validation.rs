//! # Validation Engine
//!
//! Consumes a token tree (and optionally the resolver's outcome) and emits a
//! structured report with statistics.
//!
//! ## Report Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ValidationReport                                  │
//! │                                                                         │
//! │  valid      errors.is_empty() - warnings never affect validity         │
//! │                                                                         │
//! │  errors     missing_reference, circular_dependency (from resolver)     │
//! │  warnings   empty_value, naming_convention, unused_token               │
//! │                                                                         │
//! │  stats      total_tokens, total_references,                            │
//! │             collections_processed, reference_chain_depth               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine walks the tree once and never mutates its input.

use serde::Serialize;

use crate::normalize::normalize_key;
use crate::resolve::Resolution;
use crate::token::TokenTree;

// =============================================================================
// Issues
// =============================================================================

/// The kind of a validation finding. Kinds map to a fixed severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingReference,
    CircularDependency,
    EmptyValue,
    NamingConvention,
    UnusedToken,
}

impl IssueKind {
    /// Errors invalidate the set; warnings never do.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            IssueKind::MissingReference | IssueKind::CircularDependency
        )
    }
}

/// One finding: the kind, the affected token, a human-readable message, and
/// an optional actionable suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub token: Option<String>,
    pub message: String,
    pub suggestion: Option<String>,
}

// =============================================================================
// Report
// =============================================================================

/// Statistics gathered in a single walk of the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStats {
    pub total_tokens: usize,
    pub total_references: usize,
    pub collections_processed: usize,
    pub reference_chain_depth: usize,
}

/// The contract every pipeline component satisfies: a structured
/// error/warning report plus statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub stats: ValidationStats,
}

// =============================================================================
// Validate
// =============================================================================

/// Validates a tree, folding in the resolver's findings when available.
///
/// Pass the PRE-resolution tree so reference statistics and unused-token
/// analysis see the aliases; the resolver's own issues and chain depth come
/// in through `resolution`.
pub fn validate(tree: &TokenTree, resolution: Option<&Resolution>) -> ValidationReport {
    let tokens = tree.tokens();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Referenced targets, for unused-token analysis.
    let referenced: std::collections::BTreeSet<String> = tokens
        .iter()
        .flat_map(|t| t.value.references())
        .map(|(_, target)| target.to_string())
        .collect();

    let total_references: usize = match resolution {
        Some(r) => r.reference_count,
        None => tokens.iter().map(|t| t.value.references().len()).sum(),
    };

    for token in &tokens {
        let joined = token.path.join();

        if token.value.has_empty_value() {
            warnings.push(ValidationIssue {
                kind: IssueKind::EmptyValue,
                token: Some(joined.clone()),
                message: format!("Token '{}' has an empty value", joined),
                suggestion: Some("Provide a value or remove the token".into()),
            });
        }

        let badly_named: Vec<&String> = token
            .path
            .segments()
            .iter()
            .filter(|s| normalize_key(s) != **s)
            .collect();
        if !badly_named.is_empty() {
            warnings.push(ValidationIssue {
                kind: IssueKind::NamingConvention,
                token: Some(joined.clone()),
                message: format!("Token '{}' does not follow kebab-case naming", joined),
                suggestion: Some(format!(
                    "Rename to '{}'",
                    token
                        .path
                        .segments()
                        .iter()
                        .map(|s| normalize_key(s))
                        .collect::<Vec<_>>()
                        .join(".")
                )),
            });
        }

        // Entry-point heuristic: short paths are public API and are expected
        // to go unreferenced.
        if token.path.len() > 2 && !referenced.contains(&joined) {
            warnings.push(ValidationIssue {
                kind: IssueKind::UnusedToken,
                token: Some(joined.clone()),
                message: format!("Token '{}' is never referenced", joined),
                suggestion: Some("Remove it or reference it from a semantic token".into()),
            });
        }
    }

    if let Some(resolution) = resolution {
        for issue in &resolution.issues {
            if issue.kind.is_error() {
                errors.push(issue.clone());
            } else {
                warnings.push(issue.clone());
            }
        }
    }

    let stats = ValidationStats {
        total_tokens: tokens.len(),
        total_references,
        collections_processed: tree.top_level_groups().len(),
        reference_chain_depth: resolution.map(|r| r.max_chain_depth).unwrap_or(0),
    };

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
        stats,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;
    use crate::token::{Token, TokenPath, TokenType, TokenValue};
    use serde_json::json;

    fn tree_of(entries: &[(&str, serde_json::Value)]) -> TokenTree {
        let mut tree = TokenTree::new();
        for (path, value) in entries {
            tree.insert(Token::new(
                TokenPath::parse(path).unwrap(),
                TokenType::Color,
                TokenValue::Single(value.clone()),
            ))
            .unwrap();
        }
        tree
    }

    #[test]
    fn test_clean_tree_is_valid() {
        let tree = tree_of(&[
            ("color.base.blue", json!("#0066ff")),
            ("color.primary", json!("{color.base.blue}")),
        ]);
        let resolution = resolve(&tree);
        let report = validate(&tree, Some(&resolution));

        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert_eq!(report.stats.total_tokens, 2);
        assert_eq!(report.stats.total_references, 1);
        assert_eq!(report.stats.collections_processed, 1);
        assert_eq!(report.stats.reference_chain_depth, 1);
    }

    #[test]
    fn test_resolver_errors_invalidate() {
        let tree = tree_of(&[("a.b.c", json!("{missing.target}"))]);
        let resolution = resolve(&tree);
        let report = validate(&tree, Some(&resolution));

        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, IssueKind::MissingReference);
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let tree = tree_of(&[("color.deep.unused", json!(""))]);
        let report = validate(&tree, None);

        assert!(report.valid);
        let kinds: Vec<_> = report.warnings.iter().map(|w| w.kind).collect();
        assert!(kinds.contains(&IssueKind::EmptyValue));
        assert!(kinds.contains(&IssueKind::UnusedToken));
    }

    #[test]
    fn test_naming_convention_warning_with_suggestion() {
        let mut tree = TokenTree::new();
        tree.insert(Token::new(
            TokenPath::from_segments(vec!["color".into(), "primaryDark".into()]).unwrap(),
            TokenType::Color,
            TokenValue::Single(json!("#001133")),
        ))
        .unwrap();

        let report = validate(&tree, None);
        let naming: Vec<_> = report
            .warnings
            .iter()
            .filter(|w| w.kind == IssueKind::NamingConvention)
            .collect();
        assert_eq!(naming.len(), 1);
        assert_eq!(
            naming[0].suggestion.as_deref(),
            Some("Rename to 'color.primary-dark'")
        );
    }

    #[test]
    fn test_entry_points_not_flagged_unused() {
        // Two-segment paths are entry points; three-segment paths are not.
        let tree = tree_of(&[
            ("color.primary", json!("#0066ff")),
            ("color.base.blue", json!("#0044cc")),
        ]);
        let report = validate(&tree, None);

        let unused: Vec<_> = report
            .warnings
            .iter()
            .filter(|w| w.kind == IssueKind::UnusedToken)
            .collect();
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].token.as_deref(), Some("color.base.blue"));
    }

    #[test]
    fn test_input_not_mutated() {
        let tree = tree_of(&[("a.b", json!("#fff"))]);
        let before = tree.clone();
        let _ = validate(&tree, None);
        assert_eq!(tree, before);
    }
}
