//! # Reference Resolver
//!
//! Substitutes `{other.token.path}` alias expressions with their resolved
//! concrete values.
//!
//! ## Resolution Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Reference Graph (per mode)                          │
//! │                                                                         │
//! │  semantic.accent ──► color.primary ──► color.base.blue  = "#0066ff"    │
//! │        depth 2            depth 1           depth 0                     │
//! │                                                                         │
//! │  button.bg ──► semantic.accent          multi-hop chains resolve       │
//! │        depth 3                          fully (topological effect)     │
//! │                                                                         │
//! │  a ──► b ──► a          cycle: ONE circular_dependency issue,          │
//! │                         members left as their raw reference strings    │
//! │                                                                         │
//! │  x ──► missing.path     missing_reference issue, value left raw        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Resolution is mode-aware: the universal layer (single-valued tokens)
//! resolves first, then each mode's subgraph resolves independently, since
//! the same alias may point to different concrete values per mode. A
//! per-mode reference falls back to the target's universal value when the
//! target has no entry for that mode.
//!
//! The input tree is never mutated; the resolver returns a new tree.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::token::{Token, TokenTree, TokenValue};
use crate::validation::{IssueKind, ValidationIssue};
use crate::MAX_REFERENCE_DEPTH;

// =============================================================================
// Resolution Outcome
// =============================================================================

/// The result of resolving a tree: the resolved copy, collected graph
/// issues, and the statistics the validation engine folds into its report.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Copy of the input tree with every resolvable reference substituted.
    pub tree: TokenTree,

    /// `missing_reference` / `circular_dependency` findings. Collected, not
    /// thrown - the rest of the tree still resolves.
    pub issues: Vec<ValidationIssue>,

    /// Total references encountered before resolution.
    pub reference_count: usize,

    /// Length of the longest resolution chain (in hops).
    pub max_chain_depth: usize,
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves every reference in the tree. See the module docs for semantics.
pub fn resolve(tree: &TokenTree) -> Resolution {
    let mut flat = tree.flatten();

    let reference_count: usize = flat
        .values()
        .map(|token| token.value.references().len())
        .sum();

    let mode_ids: BTreeSet<String> = flat
        .values()
        .flat_map(|token| token.value.mode_ids().into_iter().map(str::to_string))
        .collect();

    let mut issues = Vec::new();
    let mut max_chain_depth = 0;

    // Universal layer first so that mode layers see concrete targets.
    resolve_layer(None, &mut flat, &mut issues, &mut max_chain_depth);
    for mode in &mode_ids {
        resolve_layer(
            Some(mode.as_str()),
            &mut flat,
            &mut issues,
            &mut max_chain_depth,
        );
    }

    Resolution {
        tree: tree.with_tokens(&flat),
        issues,
        reference_count,
        max_chain_depth,
    }
}

/// Resolves one layer: the universal slot (`mode == None`) or one mode's
/// slot of every per-mode token.
fn resolve_layer(
    mode: Option<&str>,
    flat: &mut BTreeMap<String, Token>,
    issues: &mut Vec<ValidationIssue>,
    max_chain_depth: &mut usize,
) {
    // Keys holding a reference in this layer.
    let ref_keys: Vec<String> = flat
        .iter()
        .filter(|(_, token)| match (&token.value, mode) {
            (TokenValue::Single(v), None) => TokenValue::reference_target(v).is_some(),
            (TokenValue::PerMode(map), Some(m)) => map
                .get(m)
                .and_then(TokenValue::reference_target)
                .is_some(),
            _ => false,
        })
        .map(|(key, _)| key.clone())
        .collect();

    let mut cycle_members: BTreeSet<String> = BTreeSet::new();

    for key in ref_keys {
        match follow_chain(&key, mode, flat, &mut cycle_members, issues) {
            ChainOutcome::Resolved(resolved, depth) => {
                *max_chain_depth = (*max_chain_depth).max(depth);
                write_slot(flat, &key, mode, resolved);
            }
            ChainOutcome::Unresolved => {}
        }
    }
}

enum ChainOutcome {
    /// Chain reached a concrete value after `usize` hops.
    Resolved(ResolvedSlot, usize),
    /// Chain hit a cycle, a missing target, or the depth guard; the raw
    /// reference string stays in place so callers can inspect it.
    Unresolved,
}

enum ResolvedSlot {
    Concrete(Value),
    /// A universal reference adopted a per-mode target; the alias inherits
    /// the target's mode-dependence and its entries resolve in mode layers.
    ModeMap(BTreeMap<String, Value>),
}

/// Walks one token's reference chain to its end.
fn follow_chain(
    start: &str,
    mode: Option<&str>,
    flat: &BTreeMap<String, Token>,
    cycle_members: &mut BTreeSet<String>,
    issues: &mut Vec<ValidationIssue>,
) -> ChainOutcome {
    let mut chain: Vec<String> = vec![start.to_string()];

    let mut current_value = match slot_value(flat, start, mode) {
        Some(v) => v.clone(),
        None => return ChainOutcome::Unresolved,
    };

    loop {
        let Some(target) = TokenValue::reference_target(&current_value).map(str::to_string) else {
            // Concrete value reached.
            let depth = chain.len() - 1;
            return ChainOutcome::Resolved(ResolvedSlot::Concrete(current_value), depth);
        };

        // Reference into a known cycle: unresolvable, but the cycle itself
        // was already reported once.
        if cycle_members.contains(&target) {
            return ChainOutcome::Unresolved;
        }

        if let Some(position) = chain.iter().position(|k| k == &target) {
            let members: Vec<String> = chain[position..].to_vec();
            cycle_members.extend(members.iter().cloned());
            issues.push(ValidationIssue {
                kind: IssueKind::CircularDependency,
                token: Some(target.clone()),
                message: format!(
                    "Circular reference chain: {} -> {}",
                    members.join(" -> "),
                    target
                ),
                suggestion: Some("Break the cycle by giving one token a literal value".into()),
            });
            return ChainOutcome::Unresolved;
        }

        if chain.len() > MAX_REFERENCE_DEPTH {
            issues.push(ValidationIssue {
                kind: IssueKind::CircularDependency,
                token: Some(start.to_string()),
                message: format!(
                    "Reference chain from '{}' exceeds the maximum depth of {}",
                    start, MAX_REFERENCE_DEPTH
                ),
                suggestion: Some("Flatten the alias chain".into()),
            });
            return ChainOutcome::Unresolved;
        }

        let Some(target_token) = flat.get(&target) else {
            issues.push(ValidationIssue {
                kind: IssueKind::MissingReference,
                token: Some(start.to_string()),
                message: match mode {
                    Some(m) => format!(
                        "Token '{}' references '{}' which does not exist (mode '{}')",
                        start, target, m
                    ),
                    None => format!(
                        "Token '{}' references '{}' which does not exist",
                        start, target
                    ),
                },
                suggestion: Some(format!("Create '{}' or fix the reference", target)),
            });
            return ChainOutcome::Unresolved;
        };

        chain.push(target.clone());

        match (&target_token.value, mode) {
            // Universal alias of a per-mode token: adopt the whole map.
            (TokenValue::PerMode(map), None) => {
                let depth = chain.len() - 1;
                return ChainOutcome::Resolved(ResolvedSlot::ModeMap(map.clone()), depth);
            }
            _ => match target_token.value.for_mode(mode) {
                Some(next) => current_value = next.clone(),
                None => {
                    issues.push(ValidationIssue {
                        kind: IssueKind::MissingReference,
                        token: Some(start.to_string()),
                        message: format!(
                            "Token '{}' references '{}' which has no value for mode '{}'",
                            start,
                            target,
                            mode.unwrap_or_default()
                        ),
                        suggestion: Some(format!(
                            "Give '{}' a value for that mode or a universal value",
                            target
                        )),
                    });
                    return ChainOutcome::Unresolved;
                }
            },
        }
    }
}

/// Reads the value a token exposes for a layer. Single tokens serve every
/// layer; per-mode tokens serve only their own modes.
fn slot_value<'a>(
    flat: &'a BTreeMap<String, Token>,
    key: &str,
    mode: Option<&str>,
) -> Option<&'a Value> {
    flat.get(key).and_then(|token| token.value.for_mode(mode))
}

/// Writes a resolved value back into a token's layer slot.
fn write_slot(flat: &mut BTreeMap<String, Token>, key: &str, mode: Option<&str>, slot: ResolvedSlot) {
    let Some(token) = flat.get_mut(key) else {
        return;
    };
    match (slot, mode) {
        (ResolvedSlot::Concrete(value), None) => {
            token.value = TokenValue::Single(value);
        }
        (ResolvedSlot::ModeMap(map), None) => {
            token.value = TokenValue::PerMode(map);
        }
        (ResolvedSlot::Concrete(value), Some(m)) => {
            if let TokenValue::PerMode(map) = &mut token.value {
                map.insert(m.to_string(), value);
            }
        }
        // A mode layer never produces a mode map.
        (ResolvedSlot::ModeMap(_), Some(_)) => {}
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{TokenPath, TokenType};
    use serde_json::json;

    fn tree_of(entries: &[(&str, Value)]) -> TokenTree {
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

    fn single(tree: &TokenTree, path: &str) -> Value {
        match &tree.get(&TokenPath::parse(path).unwrap()).unwrap().value {
            TokenValue::Single(v) => v.clone(),
            other => panic!("expected single value, got {:?}", other),
        }
    }

    #[test]
    fn test_multi_hop_resolution() {
        let tree = tree_of(&[
            ("color.base.blue", json!("#0066ff")),
            ("color.primary", json!("{color.base.blue}")),
            ("semantic.accent", json!("{color.primary}")),
        ]);

        let resolution = resolve(&tree);
        assert!(resolution.issues.is_empty());
        assert_eq!(single(&resolution.tree, "semantic.accent"), json!("#0066ff"));
        assert_eq!(single(&resolution.tree, "color.primary"), json!("#0066ff"));
        assert_eq!(resolution.reference_count, 2);
        assert_eq!(resolution.max_chain_depth, 2);
    }

    #[test]
    fn test_no_residual_references_in_acyclic_graph() {
        let tree = tree_of(&[
            ("a.base", json!("#111111")),
            ("a.one", json!("{a.base}")),
            ("a.two", json!("{a.one}")),
            ("a.three", json!("{a.two}")),
        ]);

        let resolution = resolve(&tree);
        assert!(resolution.issues.is_empty());
        for token in resolution.tree.tokens() {
            assert!(token.value.references().is_empty(), "{} unresolved", token.path);
        }
    }

    #[test]
    fn test_cycle_reports_once_and_terminates() {
        let tree = tree_of(&[
            ("a.first", json!("{a.second}")),
            ("a.second", json!("{a.first}")),
        ]);

        let resolution = resolve(&tree);
        let cycles: Vec<_> = resolution
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::CircularDependency)
            .collect();
        assert_eq!(cycles.len(), 1);

        // Cycle members keep their raw reference strings for inspection.
        assert_eq!(single(&resolution.tree, "a.first"), json!("{a.second}"));
        assert_eq!(single(&resolution.tree, "a.second"), json!("{a.first}"));
    }

    #[test]
    fn test_two_cycles_two_issues() {
        let tree = tree_of(&[
            ("a.one", json!("{a.two}")),
            ("a.two", json!("{a.one}")),
            ("b.one", json!("{b.two}")),
            ("b.two", json!("{b.one}")),
        ]);

        let resolution = resolve(&tree);
        let cycles = resolution
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::CircularDependency)
            .count();
        assert_eq!(cycles, 2);
    }

    #[test]
    fn test_missing_reference() {
        let tree = tree_of(&[("a.orphan", json!("{does.not.exist}"))]);

        let resolution = resolve(&tree);
        assert_eq!(resolution.issues.len(), 1);
        assert_eq!(resolution.issues[0].kind, IssueKind::MissingReference);
        assert_eq!(single(&resolution.tree, "a.orphan"), json!("{does.not.exist}"));
    }

    #[test]
    fn test_mode_aware_resolution() {
        let mut tree = tree_of(&[
            ("color.white", json!("#ffffff")),
            ("color.black", json!("#000000")),
        ]);

        let mut by_mode = BTreeMap::new();
        by_mode.insert("light".to_string(), json!("{color.white}"));
        by_mode.insert("dark".to_string(), json!("{color.black}"));
        tree.insert(Token::new(
            TokenPath::parse("semantic.surface").unwrap(),
            TokenType::Color,
            TokenValue::PerMode(by_mode),
        ))
        .unwrap();

        let resolution = resolve(&tree);
        assert!(resolution.issues.is_empty());

        let surface = resolution
            .tree
            .get(&TokenPath::parse("semantic.surface").unwrap())
            .unwrap();
        match &surface.value {
            TokenValue::PerMode(map) => {
                assert_eq!(map["light"], json!("#ffffff"));
                assert_eq!(map["dark"], json!("#000000"));
            }
            other => panic!("expected per-mode value, got {:?}", other),
        }
    }

    #[test]
    fn test_universal_alias_adopts_mode_map() {
        let mut tree = TokenTree::new();
        let mut by_mode = BTreeMap::new();
        by_mode.insert("light".to_string(), json!("#ffffff"));
        by_mode.insert("dark".to_string(), json!("#111111"));
        tree.insert(Token::new(
            TokenPath::parse("color.surface").unwrap(),
            TokenType::Color,
            TokenValue::PerMode(by_mode),
        ))
        .unwrap();
        tree.insert(Token::new(
            TokenPath::parse("semantic.background").unwrap(),
            TokenType::Color,
            TokenValue::Single(json!("{color.surface}")),
        ))
        .unwrap();

        let resolution = resolve(&tree);
        let background = resolution
            .tree
            .get(&TokenPath::parse("semantic.background").unwrap())
            .unwrap();
        match &background.value {
            TokenValue::PerMode(map) => assert_eq!(map["dark"], json!("#111111")),
            other => panic!("expected adopted mode map, got {:?}", other),
        }
    }

    #[test]
    fn test_input_tree_untouched() {
        let tree = tree_of(&[
            ("a.base", json!("#222222")),
            ("a.alias", json!("{a.base}")),
        ]);
        let before = tree.clone();

        let _ = resolve(&tree);
        assert_eq!(tree, before);
    }
}
