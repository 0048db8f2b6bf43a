//! # Canonical Token Model
//!
//! Domain types for the Lumen token pipeline.
//!
//! ## Two Representations, One Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    TokenTree ⇄ Flat Map                                 │
//! │                                                                         │
//! │  Nested (storage / canonical JSON)     Flat (resolution / bindings)    │
//! │  ──────────────────────────────────    ─────────────────────────────   │
//! │  color                                 "color.primary"  → Token        │
//! │  ├── primary   → Token                 "color.surface"  → Token        │
//! │  └── surface   → Token                 "spacing.md"     → Token        │
//! │  spacing                                                                │
//! │  └── md        → Token                                                  │
//! │                                                                         │
//! │  flatten() and from_flat() round-trip losslessly.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Value Semantics
//! A token value is either a single universal value or a per-mode map
//! (e.g. light/dark). Either form may hold a reference expression
//! `{other.token.path}` instead of a literal; references are left untouched
//! here and substituted by the resolver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreResult, TokenError};
use crate::PATH_SEPARATOR;

// =============================================================================
// Token Type
// =============================================================================

/// The canonical type of a token value.
///
/// Never empty: when a source dialect carries no type, one is inferred from
/// the path via [`TokenType::infer_from_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    Color,
    Dimension,
    String,
    Number,
    Boolean,
    FontSize,
    FontWeight,
    LineHeight,
    Shadow,
    Duration,
    BorderRadius,
    BorderWidth,
}

impl TokenType {
    /// Parses a dialect type string, accepting common synonyms.
    pub fn parse(raw: &str) -> Option<TokenType> {
        match raw.trim() {
            "color" | "colour" => Some(TokenType::Color),
            "dimension" | "spacing" | "sizing" | "space" | "size" => Some(TokenType::Dimension),
            "string" | "text" | "fontFamily" | "fontFamilies" => Some(TokenType::String),
            "number" | "float" => Some(TokenType::Number),
            "boolean" | "bool" => Some(TokenType::Boolean),
            "fontSize" | "fontSizes" => Some(TokenType::FontSize),
            "fontWeight" | "fontWeights" => Some(TokenType::FontWeight),
            "lineHeight" | "lineHeights" => Some(TokenType::LineHeight),
            "shadow" | "boxShadow" => Some(TokenType::Shadow),
            "duration" | "time" => Some(TokenType::Duration),
            "borderRadius" => Some(TokenType::BorderRadius),
            "borderWidth" => Some(TokenType::BorderWidth),
            _ => None,
        }
    }

    /// Infers a type from path keywords when the source dialect carries none.
    ///
    /// Property/synonym heuristics: `radius` and the spacing/sizing family
    /// infer `dimension`, `shadow` infers `shadow`, and so on. The ordered
    /// override table in [`crate::normalize`] runs after this and wins.
    pub fn infer_from_path(path: &TokenPath) -> TokenType {
        let joined = path.join();

        const KEYWORDS: &[(&str, TokenType)] = &[
            ("font-size", TokenType::FontSize),
            ("font-weight", TokenType::FontWeight),
            ("line-height", TokenType::LineHeight),
            ("color", TokenType::Color),
            ("colour", TokenType::Color),
            ("shadow", TokenType::Shadow),
            ("duration", TokenType::Duration),
            ("transition", TokenType::Duration),
            ("weight", TokenType::FontWeight),
            ("radius", TokenType::Dimension),
            ("spacing", TokenType::Dimension),
            ("space", TokenType::Dimension),
            ("sizing", TokenType::Dimension),
            ("size", TokenType::Dimension),
            ("width", TokenType::Dimension),
            ("height", TokenType::Dimension),
            ("gap", TokenType::Dimension),
            ("padding", TokenType::Dimension),
            ("margin", TokenType::Dimension),
            ("opacity", TokenType::Number),
        ];

        for (keyword, token_type) in KEYWORDS {
            if joined.contains(keyword) {
                return *token_type;
            }
        }
        TokenType::String
    }

    /// Returns true for types whose string values carry a unit suffix
    /// (`"16px"`, `"1.5rem"`, `"120%"`).
    pub fn is_unit_bearing(&self) -> bool {
        matches!(
            self,
            TokenType::Dimension
                | TokenType::FontSize
                | TokenType::LineHeight
                | TokenType::BorderRadius
                | TokenType::BorderWidth
        )
    }

    /// Default unit applied when a unit-bearing value arrives bare.
    pub fn default_unit(&self) -> Option<&'static str> {
        match self {
            TokenType::LineHeight => Some("%"),
            t if t.is_unit_bearing() => Some("px"),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenType::Color => "color",
            TokenType::Dimension => "dimension",
            TokenType::String => "string",
            TokenType::Number => "number",
            TokenType::Boolean => "boolean",
            TokenType::FontSize => "fontSize",
            TokenType::FontWeight => "fontWeight",
            TokenType::LineHeight => "lineHeight",
            TokenType::Shadow => "shadow",
            TokenType::Duration => "duration",
            TokenType::BorderRadius => "borderRadius",
            TokenType::BorderWidth => "borderWidth",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// Token Path
// =============================================================================

/// An ordered list of normalized, lower-kebab-case path segments.
///
/// Unique within a canonical tree. Displayed dot-joined
/// (`"color.primary"`); joining and re-splitting round-trips losslessly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenPath(Vec<String>);

impl TokenPath {
    /// Builds a path from pre-normalized segments.
    pub fn from_segments(segments: Vec<String>) -> CoreResult<TokenPath> {
        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(TokenError::EmptyPathSegment {
                path: segments.join("."),
            });
        }
        Ok(TokenPath(segments))
    }

    /// Parses a dot-separated path string.
    pub fn parse(raw: &str) -> CoreResult<TokenPath> {
        TokenPath::from_segments(raw.split(PATH_SEPARATOR).map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dot-joined form, the key of the flattened representation.
    pub fn join(&self) -> String {
        self.0.join(".")
    }

    /// Dash-joined form, used by the binding generator.
    pub fn join_dashed(&self) -> String {
        self.0.join("-")
    }

    /// Returns true if any segment contains the given keyword.
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        self.0.iter().any(|s| s.contains(keyword))
    }
}

impl std::fmt::Display for TokenPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.join())
    }
}

// =============================================================================
// Token Value
// =============================================================================

/// A token's value: one universal value, or one value per mode.
///
/// Either form may hold a reference expression `{other.path}` in place of a
/// literal. The invariant that every mode id exists in the owning
/// collection's mode list is checked at the import boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// A single value for all modes.
    Single(Value),

    /// One value per mode id.
    PerMode(BTreeMap<String, Value>),
}

impl TokenValue {
    /// Extracts the reference target from a raw value of the exact form
    /// `{dot.separated.path}`.
    pub fn reference_target(value: &Value) -> Option<&str> {
        let raw = value.as_str()?;
        let inner = raw.strip_prefix('{')?.strip_suffix('}')?;
        if inner.is_empty() || inner.contains('{') || inner.contains('}') {
            return None;
        }
        Some(inner)
    }

    /// Enumerates the references held by this value as
    /// `(mode, target)` pairs. `mode` is `None` for a universal value.
    pub fn references(&self) -> Vec<(Option<&str>, &str)> {
        match self {
            TokenValue::Single(v) => TokenValue::reference_target(v)
                .map(|t| vec![(None, t)])
                .unwrap_or_default(),
            TokenValue::PerMode(map) => map
                .iter()
                .filter_map(|(mode, v)| {
                    TokenValue::reference_target(v).map(|t| (Some(mode.as_str()), t))
                })
                .collect(),
        }
    }

    /// Returns the value for a mode, falling back to the universal value.
    pub fn for_mode(&self, mode: Option<&str>) -> Option<&Value> {
        match (self, mode) {
            (TokenValue::Single(v), _) => Some(v),
            (TokenValue::PerMode(map), Some(m)) => map.get(m),
            (TokenValue::PerMode(_), None) => None,
        }
    }

    /// JSON form of this value (mode maps become objects).
    pub fn to_json(&self) -> Value {
        match self {
            TokenValue::Single(v) => v.clone(),
            TokenValue::PerMode(map) => {
                Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            }
        }
    }

    /// Mode ids held by a per-mode value (empty for universal values).
    pub fn mode_ids(&self) -> Vec<&str> {
        match self {
            TokenValue::Single(_) => Vec::new(),
            TokenValue::PerMode(map) => map.keys().map(String::as_str).collect(),
        }
    }

    /// Returns true if the value is empty (empty string or null) for any
    /// mode. Used by the validation engine's `empty_value` warning.
    pub fn has_empty_value(&self) -> bool {
        let is_empty = |v: &Value| v.is_null() || v.as_str().is_some_and(|s| s.trim().is_empty());
        match self {
            TokenValue::Single(v) => is_empty(v),
            TokenValue::PerMode(map) => map.values().any(is_empty),
        }
    }
}

// =============================================================================
// Token
// =============================================================================

/// A leaf node of the canonical tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Normalized, lower-kebab-case path. Unique within a tree.
    pub path: TokenPath,

    /// Canonical type. Never empty - inferred from the path when absent.
    pub token_type: TokenType,

    /// Literal value, per-mode values, or reference expression(s).
    pub value: TokenValue,

    /// Human-readable description, with structured annotations stripped.
    pub description: Option<String>,

    /// Namespaced side-channel metadata (extracted units, description
    /// annotations). Keys are `lumen.<name>`.
    pub extensions: Option<BTreeMap<String, Value>>,
}

impl Token {
    /// Creates a token with no description or extensions.
    pub fn new(path: TokenPath, token_type: TokenType, value: TokenValue) -> Token {
        Token {
            path,
            token_type,
            value,
            description: None,
            extensions: None,
        }
    }

    /// Returns true if any held value is a reference expression.
    pub fn is_reference(&self) -> bool {
        !self.value.references().is_empty()
    }

    /// Records a namespaced extension entry (`lumen.<key>`).
    pub fn set_extension(&mut self, key: &str, value: Value) {
        self.extensions
            .get_or_insert_with(BTreeMap::new)
            .insert(format!("{}.{}", crate::EXTENSION_NAMESPACE, key), value);
    }
}

// =============================================================================
// Token Tree
// =============================================================================

/// A node of the nested representation: a group of children or a leaf token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenNode {
    Group(BTreeMap<String, TokenNode>),
    Leaf(Token),
}

/// The canonical nested token tree.
///
/// Isomorphic to the flattened `{dotted path → Token}` map; both directions
/// are lossless. `BTreeMap` keeps iteration deterministic, which the binding
/// generator and exporter rely on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenTree {
    root: BTreeMap<String, TokenNode>,
}

impl TokenTree {
    pub fn new() -> TokenTree {
        TokenTree::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of leaf tokens in the tree.
    pub fn len(&self) -> usize {
        fn count(nodes: &BTreeMap<String, TokenNode>) -> usize {
            nodes
                .values()
                .map(|n| match n {
                    TokenNode::Leaf(_) => 1,
                    TokenNode::Group(children) => count(children),
                })
                .sum()
        }
        count(&self.root)
    }

    /// Top-level group names. Used as the "collections touched" statistic
    /// for trees without explicit collection metadata.
    pub fn top_level_groups(&self) -> Vec<&str> {
        self.root.keys().map(String::as_str).collect()
    }

    /// Inserts a token at its path, creating intermediate groups.
    ///
    /// Fails with [`TokenError::PathCollision`] when a leaf already occupies
    /// a segment that must become a group, or vice versa.
    pub fn insert(&mut self, token: Token) -> CoreResult<()> {
        let segments = token.path.segments().to_vec();
        let joined = token.path.join();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| TokenError::EmptyPathSegment {
                path: joined.clone(),
            })?;

        let mut current = &mut self.root;
        for segment in parents {
            let entry = current
                .entry(segment.clone())
                .or_insert_with(|| TokenNode::Group(BTreeMap::new()));
            match entry {
                TokenNode::Group(children) => current = children,
                TokenNode::Leaf(_) => {
                    return Err(TokenError::PathCollision { path: joined });
                }
            }
        }

        match current.get(last) {
            Some(_) => Err(TokenError::PathCollision { path: joined }),
            None => {
                current.insert(last.clone(), TokenNode::Leaf(token));
                Ok(())
            }
        }
    }

    /// Looks up a token by path.
    pub fn get(&self, path: &TokenPath) -> Option<&Token> {
        let segments = path.segments();
        let (last, parents) = segments.split_last()?;

        let mut current = &self.root;
        for segment in parents {
            match current.get(segment)? {
                TokenNode::Group(children) => current = children,
                TokenNode::Leaf(_) => return None,
            }
        }
        match current.get(last)? {
            TokenNode::Leaf(token) => Some(token),
            TokenNode::Group(_) => None,
        }
    }

    /// Flattens the tree into a `{dotted path → Token}` map.
    pub fn flatten(&self) -> BTreeMap<String, Token> {
        fn walk(nodes: &BTreeMap<String, TokenNode>, out: &mut BTreeMap<String, Token>) {
            for node in nodes.values() {
                match node {
                    TokenNode::Leaf(token) => {
                        out.insert(token.path.join(), token.clone());
                    }
                    TokenNode::Group(children) => walk(children, out),
                }
            }
        }
        let mut out = BTreeMap::new();
        walk(&self.root, &mut out);
        out
    }

    /// Rebuilds a tree from a flattened map. Inverse of [`TokenTree::flatten`].
    pub fn from_flat(flat: BTreeMap<String, Token>) -> CoreResult<TokenTree> {
        let mut tree = TokenTree::new();
        for (_, token) in flat {
            tree.insert(token)?;
        }
        Ok(tree)
    }

    /// All leaf tokens in deterministic path order.
    pub fn tokens(&self) -> Vec<&Token> {
        fn walk<'a>(nodes: &'a BTreeMap<String, TokenNode>, out: &mut Vec<&'a Token>) {
            for node in nodes.values() {
                match node {
                    TokenNode::Leaf(token) => out.push(token),
                    TokenNode::Group(children) => walk(children, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    /// Returns a copy of the tree with each leaf replaced by the same-path
    /// entry from `flat` when one is present. Structure is preserved; leaves
    /// absent from the map are kept as-is.
    pub fn with_tokens(&self, flat: &BTreeMap<String, Token>) -> TokenTree {
        fn rebuild(
            nodes: &BTreeMap<String, TokenNode>,
            flat: &BTreeMap<String, Token>,
        ) -> BTreeMap<String, TokenNode> {
            nodes
                .iter()
                .map(|(key, node)| {
                    let rebuilt = match node {
                        TokenNode::Group(children) => TokenNode::Group(rebuild(children, flat)),
                        TokenNode::Leaf(token) => TokenNode::Leaf(
                            flat.get(&token.path.join()).cloned().unwrap_or_else(|| token.clone()),
                        ),
                    };
                    (key.clone(), rebuilt)
                })
                .collect()
        }
        TokenTree {
            root: rebuild(&self.root, flat),
        }
    }

    /// Serializes to the canonical `$type`/`$value` JSON document.
    ///
    /// Per-mode values are written under `$valuesByMode`; single values under
    /// `$value`.
    pub fn to_canonical_json(&self) -> Value {
        fn node_json(node: &TokenNode) -> Value {
            match node {
                TokenNode::Group(children) => Value::Object(
                    children
                        .iter()
                        .map(|(k, v)| (k.clone(), node_json(v)))
                        .collect(),
                ),
                TokenNode::Leaf(token) => {
                    let mut obj = serde_json::Map::new();
                    obj.insert(
                        "$type".to_string(),
                        Value::String(token.token_type.to_string()),
                    );
                    match &token.value {
                        TokenValue::Single(v) => {
                            obj.insert("$value".to_string(), v.clone());
                        }
                        TokenValue::PerMode(_) => {
                            obj.insert("$valuesByMode".to_string(), token.value.to_json());
                        }
                    }
                    if let Some(desc) = &token.description {
                        obj.insert("$description".to_string(), Value::String(desc.clone()));
                    }
                    if let Some(ext) = &token.extensions {
                        obj.insert(
                            "$extensions".to_string(),
                            Value::Object(ext.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
                        );
                    }
                    Value::Object(obj)
                }
            }
        }

        Value::Object(
            self.root
                .iter()
                .map(|(k, v)| (k.clone(), node_json(v)))
                .collect(),
        )
    }
}

// =============================================================================
// Collections and Modes
// =============================================================================

/// A named variant axis (e.g. light/dark) under which a token may hold a
/// different concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub id: String,
    pub name: String,
}

/// A group of tokens whose values may vary per mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub modes: Vec<Mode>,
}

impl Collection {
    pub fn has_mode(&self, mode_id: &str) -> bool {
        self.modes.iter().any(|m| m.id == mode_id)
    }
}

// =============================================================================
// Token Set
// =============================================================================

/// One canonical tree for one (collection, mode) pair.
///
/// The unit of work for the importer, the exporter, and the sync client.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSet {
    pub collection: String,
    pub mode: String,
    pub tree: TokenTree,
}

impl TokenSet {
    pub fn token_count(&self) -> usize {
        self.tree.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(path: &str, token_type: TokenType, value: Value) -> Token {
        Token::new(
            TokenPath::parse(path).unwrap(),
            token_type,
            TokenValue::Single(value),
        )
    }

    #[test]
    fn test_flatten_round_trip() {
        let mut tree = TokenTree::new();
        tree.insert(token("color.primary", TokenType::Color, json!("#0066ff")))
            .unwrap();
        tree.insert(token("color.surface", TokenType::Color, json!("#ffffff")))
            .unwrap();
        tree.insert(token("spacing.md", TokenType::Dimension, json!(16)))
            .unwrap();

        let flat = tree.flatten();
        assert_eq!(flat.len(), 3);
        assert!(flat.contains_key("color.primary"));

        let rebuilt = TokenTree::from_flat(flat).unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn test_insert_collision() {
        let mut tree = TokenTree::new();
        tree.insert(token("color.primary", TokenType::Color, json!("#000")))
            .unwrap();

        // Leaf already present at the exact path
        let err = tree
            .insert(token("color.primary", TokenType::Color, json!("#fff")))
            .unwrap_err();
        assert!(matches!(err, TokenError::PathCollision { .. }));

        // Leaf occupies a segment that would need to become a group
        let err = tree
            .insert(token("color.primary.hover", TokenType::Color, json!("#111")))
            .unwrap_err();
        assert!(matches!(err, TokenError::PathCollision { .. }));
    }

    #[test]
    fn test_reference_target() {
        assert_eq!(
            TokenValue::reference_target(&json!("{color.primary}")),
            Some("color.primary")
        );
        assert_eq!(TokenValue::reference_target(&json!("#0066ff")), None);
        assert_eq!(TokenValue::reference_target(&json!("{}")), None);
        assert_eq!(TokenValue::reference_target(&json!("{a}{b}")), None);
        assert_eq!(TokenValue::reference_target(&json!(12)), None);
    }

    #[test]
    fn test_per_mode_references() {
        let mut by_mode = BTreeMap::new();
        by_mode.insert("light".to_string(), json!("{color.base.white}"));
        by_mode.insert("dark".to_string(), json!("#111111"));
        let value = TokenValue::PerMode(by_mode);

        let refs = value.references();
        assert_eq!(refs, vec![(Some("light"), "color.base.white")]);
    }

    #[test]
    fn test_type_parse_and_inference() {
        assert_eq!(TokenType::parse("boxShadow"), Some(TokenType::Shadow));
        assert_eq!(TokenType::parse("spacing"), Some(TokenType::Dimension));
        assert_eq!(TokenType::parse("nonsense"), None);

        let path = TokenPath::parse("border.radius.lg").unwrap();
        assert_eq!(TokenType::infer_from_path(&path), TokenType::Dimension);
        let path = TokenPath::parse("elevation.shadow.raised").unwrap();
        assert_eq!(TokenType::infer_from_path(&path), TokenType::Shadow);
        let path = TokenPath::parse("brand.primary-color").unwrap();
        assert_eq!(TokenType::infer_from_path(&path), TokenType::Color);
    }

    #[test]
    fn test_default_units() {
        assert_eq!(TokenType::Dimension.default_unit(), Some("px"));
        assert_eq!(TokenType::LineHeight.default_unit(), Some("%"));
        assert_eq!(TokenType::Color.default_unit(), None);
    }

    #[test]
    fn test_canonical_json_shape() {
        let mut tree = TokenTree::new();
        let mut t = token("color.primary", TokenType::Color, json!("#0066ff"));
        t.description = Some("Brand primary".to_string());
        tree.insert(t).unwrap();

        let doc = tree.to_canonical_json();
        assert_eq!(doc["color"]["primary"]["$type"], json!("color"));
        assert_eq!(doc["color"]["primary"]["$value"], json!("#0066ff"));
        assert_eq!(doc["color"]["primary"]["$description"], json!("Brand primary"));
    }

    #[test]
    fn test_empty_value_detection() {
        assert!(TokenValue::Single(json!("")).has_empty_value());
        assert!(TokenValue::Single(Value::Null).has_empty_value());
        assert!(!TokenValue::Single(json!("#fff")).has_empty_value());
    }
}
