//! # Format Normalizer
//!
//! Detects which token JSON dialect a document uses and converts it into the
//! canonical token tree.
//!
//! ## Detection Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Dialect Detection (priority order)                    │
//! │                                                                         │
//! │  1. Canonical         leaf objects with $type / $value                 │
//! │  2. Style Dictionary  leaf objects with flat value / type              │
//! │  3. Tokens Studio     top-level $themes array + flat value leaves      │
//! │  4. Material palette  palette.<name>.{main,light,dark}                 │
//! │  5. CSS variables     flat map of --custom-property: value strings     │
//! │                                                                         │
//! │  Rules are an ordered table of {predicate, converter} pairs.           │
//! │  First matching predicate wins; no match → UnrecognizedFormat.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Normalization applied to every dialect
//! - path segments lower-kebab-cased (`primaryColor` → `primary-color`),
//!   including segments inside `{...}` reference expressions
//! - unit-bearing string values split into a bare numeric value plus a unit
//!   recorded under the token's extensions (`lumen.unit`)
//! - ordered path-pattern type overrides applied after dialect inference
//! - `@key value` description lines lifted into extensions

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{CoreResult, TokenError};
use crate::token::{Token, TokenPath, TokenTree, TokenType, TokenValue};

// =============================================================================
// Dialects
// =============================================================================

/// A recognized third-party token JSON shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDialect {
    /// W3C-style `$type` / `$value` leaves. The canonical format itself.
    Canonical,
    /// Flat `value` / `type` pair per leaf.
    StyleDictionary,
    /// Top-level `$themes` array plus flat `value` / `type` leaves.
    TokensStudio,
    /// `palette.<name>.{main,light,dark}` shape.
    MaterialPalette,
    /// Flat map of `--custom-property: value` strings.
    CssVariables,
}

impl std::fmt::Display for TokenDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenDialect::Canonical => write!(f, "canonical"),
            TokenDialect::StyleDictionary => write!(f, "style-dictionary"),
            TokenDialect::TokensStudio => write!(f, "tokens-studio"),
            TokenDialect::MaterialPalette => write!(f, "material-palette"),
            TokenDialect::CssVariables => write!(f, "css-variables"),
        }
    }
}

/// One entry of the detection table: a fingerprint predicate plus the
/// converter that turns a matching document into a canonical tree.
struct DialectRule {
    dialect: TokenDialect,
    detect: fn(&Value) -> bool,
    convert: fn(&Value) -> CoreResult<TokenTree>,
}

/// Ordered by priority; the first matching predicate wins.
static DIALECT_RULES: &[DialectRule] = &[
    DialectRule {
        dialect: TokenDialect::Canonical,
        detect: detect_canonical,
        convert: convert_canonical,
    },
    DialectRule {
        dialect: TokenDialect::StyleDictionary,
        detect: detect_style_dictionary,
        convert: convert_style_dictionary,
    },
    DialectRule {
        dialect: TokenDialect::TokensStudio,
        detect: detect_tokens_studio,
        convert: convert_tokens_studio,
    },
    DialectRule {
        dialect: TokenDialect::MaterialPalette,
        detect: detect_material_palette,
        convert: convert_material_palette,
    },
    DialectRule {
        dialect: TokenDialect::CssVariables,
        detect: detect_css_variables,
        convert: convert_css_variables,
    },
];

// =============================================================================
// Public API
// =============================================================================

/// Parses a raw token document, surfacing malformed JSON as a typed error.
pub fn parse_document(raw: &str) -> CoreResult<Value> {
    serde_json::from_str(raw).map_err(|e| TokenError::Parse {
        reason: e.to_string(),
    })
}

/// Returns the dialect whose fingerprint matches the document, if any.
pub fn detect_dialect(doc: &Value) -> Option<TokenDialect> {
    DIALECT_RULES
        .iter()
        .find(|rule| (rule.detect)(doc))
        .map(|rule| rule.dialect)
}

/// Converts a document into the canonical tree.
///
/// A `hint` skips detection; without one, the detection table runs in
/// priority order. A document matching no dialect fails with
/// [`TokenError::UnrecognizedFormat`] rather than producing an empty tree.
pub fn normalize_document(doc: &Value, hint: Option<TokenDialect>) -> CoreResult<TokenTree> {
    let dialect = hint
        .or_else(|| detect_dialect(doc))
        .ok_or(TokenError::UnrecognizedFormat)?;

    let rule = DIALECT_RULES
        .iter()
        .find(|rule| rule.dialect == dialect)
        .ok_or(TokenError::UnrecognizedFormat)?;

    (rule.convert)(doc)
}

/// Parses and normalizes in one step.
pub fn parse_and_normalize(raw: &str, hint: Option<TokenDialect>) -> CoreResult<TokenTree> {
    let doc = parse_document(raw)?;
    normalize_document(&doc, hint)
}

// =============================================================================
// Key and Reference Normalization
// =============================================================================

/// Lower-kebab-cases a path segment: camelCase humps and whitespace become
/// dashes, underscores become dashes, runs collapse. Idempotent.
pub fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    for ch in raw.trim().chars() {
        if ch.is_uppercase() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            for low in ch.to_lowercase() {
                out.push(low);
            }
        } else if ch.is_whitespace() || ch == '_' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        } else {
            out.push(ch);
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Normalizes the segments inside a `{dot.separated.path}` reference so
/// aliases remain valid after key normalization. Non-reference strings pass
/// through unchanged.
pub fn normalize_reference(raw: &str) -> String {
    match TokenValue::reference_target(&Value::String(raw.to_string())) {
        Some(target) => {
            let normalized: Vec<String> = target.split('.').map(normalize_key).collect();
            format!("{{{}}}", normalized.join("."))
        }
        None => raw.to_string(),
    }
}

// =============================================================================
// Type Overrides
// =============================================================================

/// Ordered path-pattern → type rules applied after dialect inference.
/// A pattern matches when the joined, normalized path contains it.
const TYPE_OVERRIDES: &[(&str, TokenType)] = &[
    ("typography.font-size", TokenType::FontSize),
    ("font-size", TokenType::FontSize),
    ("font-weight", TokenType::FontWeight),
    ("line-height", TokenType::LineHeight),
    ("border-radius", TokenType::BorderRadius),
    ("border-width", TokenType::BorderWidth),
];

fn apply_type_overrides(path: &TokenPath, inferred: TokenType) -> TokenType {
    let joined = path.join();
    for (pattern, token_type) in TYPE_OVERRIDES {
        if joined.contains(pattern) {
            return *token_type;
        }
    }
    inferred
}

// =============================================================================
// Unit Extraction
// =============================================================================

/// Splits `<number><unit>?` strings into a bare numeric value and a unit.
/// Returns `None` when the string is not a plain measured value.
fn split_unit(raw: &str) -> Option<(f64, Option<String>)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let number_end = trimmed
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-'))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;

    let number: f64 = trimmed[..number_end].parse().ok()?;
    let unit = trimmed[number_end..].trim();

    if unit.is_empty() {
        return Some((number, None));
    }
    if unit == "%" || unit.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some((number, Some(unit.to_string())));
    }
    None
}

// =============================================================================
// Description Metadata
// =============================================================================

/// Lifts `@key value` lines out of a description into extension entries
/// (unit hints, font-loading metadata). Returns the cleaned description and
/// the extracted pairs.
fn split_description_metadata(raw: &str) -> (Option<String>, Vec<(String, Value)>) {
    let mut clean = Vec::new();
    let mut meta = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix('@') {
            if let Some((key, value)) = rest.split_once(char::is_whitespace) {
                meta.push((
                    key.trim().to_string(),
                    Value::String(value.trim().to_string()),
                ));
                continue;
            }
        }
        clean.push(line);
    }

    let clean = clean.join("\n").trim().to_string();
    let clean = if clean.is_empty() { None } else { Some(clean) };
    (clean, meta)
}

// =============================================================================
// Leaf Assembly (shared by every converter)
// =============================================================================

/// Raw leaf data as a converter extracted it from the source dialect.
struct RawLeaf {
    segments: Vec<String>,
    declared_type: Option<String>,
    value: LeafValue,
    description: Option<String>,
    carried_extensions: Option<BTreeMap<String, Value>>,
}

enum LeafValue {
    Single(Value),
    PerMode(BTreeMap<String, Value>),
}

/// Applies the uniform normalization side-effects and inserts the token.
fn finish_leaf(tree: &mut TokenTree, leaf: RawLeaf) -> CoreResult<()> {
    let segments: Vec<String> = leaf.segments.iter().map(|s| normalize_key(s)).collect();
    let path = TokenPath::from_segments(segments)?;

    let token_type = leaf
        .declared_type
        .as_deref()
        .and_then(TokenType::parse)
        .unwrap_or_else(|| TokenType::infer_from_path(&path));
    let token_type = apply_type_overrides(&path, token_type);

    let mut extensions = leaf.carried_extensions.unwrap_or_default();
    let unit_key = format!("{}.unit", crate::EXTENSION_NAMESPACE);

    let mut normalize_value = |value: Value| -> Value {
        if let Some(raw) = value.as_str() {
            let referenced = normalize_reference(raw);
            if referenced != raw {
                return Value::String(referenced);
            }
            if token_type.is_unit_bearing() {
                if let Some((number, unit)) = split_unit(raw) {
                    let unit = unit.or_else(|| token_type.default_unit().map(str::to_string));
                    if let Some(unit) = unit {
                        extensions.insert(unit_key.clone(), Value::String(unit));
                    }
                    return serde_json::Number::from_f64(number)
                        .map(Value::Number)
                        .unwrap_or(value);
                }
            }
            return value;
        }
        if value.is_number() && token_type.is_unit_bearing() && !extensions.contains_key(&unit_key)
        {
            if let Some(unit) = token_type.default_unit() {
                extensions.insert(unit_key.clone(), Value::String(unit.to_string()));
            }
        }
        value
    };

    let value = match leaf.value {
        LeafValue::Single(v) => TokenValue::Single(normalize_value(v)),
        LeafValue::PerMode(map) => TokenValue::PerMode(
            map.into_iter()
                .map(|(mode, v)| (mode, normalize_value(v)))
                .collect(),
        ),
    };

    let description = match leaf.description {
        Some(raw) => {
            let (clean, meta) = split_description_metadata(&raw);
            for (key, value) in meta {
                extensions.insert(format!("{}.{}", crate::EXTENSION_NAMESPACE, key), value);
            }
            clean
        }
        None => None,
    };

    let mut token = Token::new(path, token_type, value);
    token.description = description;
    if !extensions.is_empty() {
        token.extensions = Some(extensions);
    }
    tree.insert(token)
}

// =============================================================================
// Dialect: Canonical ($type / $value)
// =============================================================================

fn is_canonical_leaf(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|o| o.contains_key("$value") || o.contains_key("$valuesByMode"))
}

fn detect_canonical(doc: &Value) -> bool {
    fn any_leaf(value: &Value) -> bool {
        match value.as_object() {
            Some(obj) => is_canonical_leaf(value) || obj.values().any(any_leaf),
            None => false,
        }
    }
    doc.is_object() && any_leaf(doc)
}

fn convert_canonical(doc: &Value) -> CoreResult<TokenTree> {
    let mut tree = TokenTree::new();
    walk_canonical(doc, &mut Vec::new(), &mut tree)?;
    Ok(tree)
}

fn walk_canonical(value: &Value, prefix: &mut Vec<String>, tree: &mut TokenTree) -> CoreResult<()> {
    let Some(obj) = value.as_object() else {
        return Ok(());
    };

    if is_canonical_leaf(value) {
        let leaf_value = if let Some(by_mode) = obj.get("$valuesByMode").and_then(Value::as_object)
        {
            LeafValue::PerMode(
                by_mode
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )
        } else {
            LeafValue::Single(obj.get("$value").cloned().unwrap_or(Value::Null))
        };

        let carried = obj.get("$extensions").and_then(Value::as_object).map(|o| {
            o.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<BTreeMap<_, _>>()
        });

        return finish_leaf(
            tree,
            RawLeaf {
                segments: prefix.clone(),
                declared_type: obj
                    .get("$type")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                value: leaf_value,
                description: obj
                    .get("$description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                carried_extensions: carried,
            },
        );
    }

    for (key, child) in obj {
        if key.starts_with('$') {
            continue;
        }
        prefix.push(key.clone());
        walk_canonical(child, prefix, tree)?;
        prefix.pop();
    }
    Ok(())
}

// =============================================================================
// Dialect: Style Dictionary (flat value / type)
// =============================================================================

fn is_flat_leaf(value: &Value) -> bool {
    value.as_object().is_some_and(|o| o.contains_key("value"))
}

fn detect_style_dictionary(doc: &Value) -> bool {
    fn any_leaf(value: &Value) -> bool {
        match value.as_object() {
            Some(obj) => is_flat_leaf(value) || obj.values().any(any_leaf),
            None => false,
        }
    }
    match doc.as_object() {
        Some(obj) => !obj.contains_key("$themes") && any_leaf(doc),
        None => false,
    }
}

fn convert_style_dictionary(doc: &Value) -> CoreResult<TokenTree> {
    let mut tree = TokenTree::new();
    walk_flat(doc, &mut Vec::new(), &mut tree)?;
    Ok(tree)
}

fn walk_flat(value: &Value, prefix: &mut Vec<String>, tree: &mut TokenTree) -> CoreResult<()> {
    let Some(obj) = value.as_object() else {
        return Ok(());
    };

    if is_flat_leaf(value) {
        let description = obj
            .get("comment")
            .or_else(|| obj.get("description"))
            .and_then(Value::as_str)
            .map(str::to_string);
        return finish_leaf(
            tree,
            RawLeaf {
                segments: prefix.clone(),
                declared_type: obj.get("type").and_then(Value::as_str).map(str::to_string),
                value: LeafValue::Single(obj.get("value").cloned().unwrap_or(Value::Null)),
                description,
                carried_extensions: None,
            },
        );
    }

    for (key, child) in obj {
        if key.starts_with('$') {
            continue;
        }
        prefix.push(key.clone());
        walk_flat(child, prefix, tree)?;
        prefix.pop();
    }
    Ok(())
}

// =============================================================================
// Dialect: Tokens Studio ($themes + flat leaves)
// =============================================================================

fn detect_tokens_studio(doc: &Value) -> bool {
    doc.as_object()
        .is_some_and(|o| o.get("$themes").is_some_and(Value::is_array))
}

fn convert_tokens_studio(doc: &Value) -> CoreResult<TokenTree> {
    // Same leaf shape as Style Dictionary; $themes / $metadata are theme
    // bookkeeping, not tokens, and the flat walker already skips $-keys.
    convert_style_dictionary(doc)
}

// =============================================================================
// Dialect: Material palette
// =============================================================================

fn detect_material_palette(doc: &Value) -> bool {
    doc.get("palette")
        .and_then(Value::as_object)
        .is_some_and(|palette| {
            palette
                .values()
                .any(|entry| entry.as_object().is_some_and(|o| o.contains_key("main")))
        })
}

fn convert_material_palette(doc: &Value) -> CoreResult<TokenTree> {
    let mut tree = TokenTree::new();
    let Some(palette) = doc.get("palette").and_then(Value::as_object) else {
        return Err(TokenError::UnrecognizedFormat);
    };

    for (name, entry) in palette {
        let Some(variants) = entry.as_object() else {
            continue;
        };
        for (variant, value) in variants {
            if !value.is_string() {
                continue;
            }
            finish_leaf(
                &mut tree,
                RawLeaf {
                    segments: vec!["palette".to_string(), name.clone(), variant.clone()],
                    declared_type: Some("color".to_string()),
                    value: LeafValue::Single(value.clone()),
                    description: None,
                    carried_extensions: None,
                },
            )?;
        }
    }
    Ok(tree)
}

// =============================================================================
// Dialect: CSS custom properties
// =============================================================================

fn detect_css_variables(doc: &Value) -> bool {
    doc.as_object().is_some_and(|obj| {
        !obj.is_empty()
            && obj
                .iter()
                .all(|(k, v)| k.starts_with("--") && v.is_string())
    })
}

fn convert_css_variables(doc: &Value) -> CoreResult<TokenTree> {
    let mut tree = TokenTree::new();
    let Some(obj) = doc.as_object() else {
        return Err(TokenError::UnrecognizedFormat);
    };

    for (key, value) in obj {
        let name = key.trim_start_matches('-');
        let segments: Vec<String> = name.split('-').map(str::to_string).collect();
        finish_leaf(
            &mut tree,
            RawLeaf {
                segments,
                declared_type: None,
                value: LeafValue::Single(value.clone()),
                description: None,
                carried_extensions: None,
            },
        )?;
    }
    Ok(tree)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("primaryColor"), "primary-color");
        assert_eq!(normalize_key("Base Color"), "base-color");
        assert_eq!(normalize_key("already-kebab"), "already-kebab");
        assert_eq!(normalize_key("snake_case"), "snake-case");
    }

    #[test]
    fn test_normalize_key_idempotent() {
        for raw in ["primaryColor", "Base Color", "a-b-c", "MixedUP Name"] {
            let once = normalize_key(raw);
            assert_eq!(normalize_key(&once), once);
        }
    }

    #[test]
    fn test_normalize_reference() {
        assert_eq!(
            normalize_reference("{colorPrimary.Base Color}"),
            "{color-primary.base-color}"
        );
        assert_eq!(normalize_reference("#0066ff"), "#0066ff");
    }

    #[test]
    fn test_split_unit() {
        assert_eq!(split_unit("16px"), Some((16.0, Some("px".to_string()))));
        assert_eq!(split_unit("1.5rem"), Some((1.5, Some("rem".to_string()))));
        assert_eq!(split_unit("120%"), Some((120.0, Some("%".to_string()))));
        assert_eq!(split_unit("24"), Some((24.0, None)));
        assert_eq!(split_unit("#0066ff"), None);
        assert_eq!(split_unit("calc(100% - 8px)"), None);
    }

    #[test]
    fn test_detect_dialects() {
        let canonical = json!({"color": {"primary": {"$type": "color", "$value": "#fff"}}});
        assert_eq!(detect_dialect(&canonical), Some(TokenDialect::Canonical));

        let sd = json!({"color": {"primary": {"value": "#fff", "type": "color"}}});
        assert_eq!(detect_dialect(&sd), Some(TokenDialect::StyleDictionary));

        let ts = json!({"$themes": [], "global": {"red": {"value": "#f00", "type": "color"}}});
        assert_eq!(detect_dialect(&ts), Some(TokenDialect::TokensStudio));

        let material = json!({"palette": {"primary": {"main": "#0066ff", "light": "#66a3ff"}}});
        assert_eq!(detect_dialect(&material), Some(TokenDialect::MaterialPalette));

        let css = json!({"--color-primary": "#0066ff", "--spacing-md": "16px"});
        assert_eq!(detect_dialect(&css), Some(TokenDialect::CssVariables));

        let nothing = json!({"random": [1, 2, 3]});
        assert_eq!(detect_dialect(&nothing), None);
    }

    #[test]
    fn test_style_dictionary_end_to_end() {
        let tree = parse_and_normalize(
            r##"{"color": {"primary": {"value": "#0066FF", "type": "color"}}}"##,
            None,
        )
        .unwrap();

        let token = tree
            .get(&TokenPath::parse("color.primary").unwrap())
            .unwrap();
        assert_eq!(token.token_type, TokenType::Color);
        assert_eq!(token.value, TokenValue::Single(json!("#0066FF")));
    }

    #[test]
    fn test_unit_extraction_and_default() {
        let doc = json!({
            "spacing": {"md": {"value": "16px", "type": "spacing"}},
            "typography": {"line-height": {"body": {"value": 150, "type": "lineHeight"}}}
        });
        let tree = normalize_document(&doc, None).unwrap();

        let spacing = tree.get(&TokenPath::parse("spacing.md").unwrap()).unwrap();
        assert_eq!(spacing.value, TokenValue::Single(json!(16.0)));
        assert_eq!(
            spacing.extensions.as_ref().unwrap().get("lumen.unit"),
            Some(&json!("px"))
        );

        let lh = tree
            .get(&TokenPath::parse("typography.line-height.body").unwrap())
            .unwrap();
        assert_eq!(lh.token_type, TokenType::LineHeight);
        assert_eq!(
            lh.extensions.as_ref().unwrap().get("lumen.unit"),
            Some(&json!("%"))
        );
    }

    #[test]
    fn test_type_override_wins() {
        let doc = json!({
            "typography": {"fontSize": {"body": {"value": "16px"}}}
        });
        let tree = normalize_document(&doc, Some(TokenDialect::StyleDictionary)).unwrap();
        let token = tree
            .get(&TokenPath::parse("typography.font-size.body").unwrap())
            .unwrap();
        assert_eq!(token.token_type, TokenType::FontSize);
    }

    #[test]
    fn test_reference_segments_normalized() {
        let doc = json!({
            "semantic": {"accent": {"value": "{colorPrimary.Base}", "type": "color"}}
        });
        let tree = normalize_document(&doc, None).unwrap();
        let token = tree
            .get(&TokenPath::parse("semantic.accent").unwrap())
            .unwrap();
        assert_eq!(
            token.value,
            TokenValue::Single(json!("{color-primary.base}"))
        );
    }

    #[test]
    fn test_description_metadata() {
        let doc = json!({
            "font": {"heading": {
                "value": "Inter",
                "type": "fontFamily",
                "comment": "Heading face\n@font-url https://fonts.example/inter.woff2"
            }}
        });
        let tree = normalize_document(&doc, None).unwrap();
        let token = tree.get(&TokenPath::parse("font.heading").unwrap()).unwrap();
        assert_eq!(token.description.as_deref(), Some("Heading face"));
        assert_eq!(
            token.extensions.as_ref().unwrap().get("lumen.font-url"),
            Some(&json!("https://fonts.example/inter.woff2"))
        );
    }

    #[test]
    fn test_normalization_idempotent_on_canonical() {
        let doc = json!({
            "color": {"primary": {"value": "#0066FF", "type": "color"}},
            "spacing": {"md": {"value": "16px", "type": "spacing"}},
            "semantic": {"accent": {"value": "{color.primary}", "type": "color"}}
        });
        let tree = normalize_document(&doc, None).unwrap();

        let canonical = tree.to_canonical_json();
        let again = normalize_document(&canonical, None).unwrap();
        assert_eq!(again, tree);
    }

    #[test]
    fn test_material_palette() {
        let doc = json!({"palette": {"primary": {"main": "#0066ff", "dark": "#003380"}}});
        let tree = normalize_document(&doc, None).unwrap();
        let token = tree
            .get(&TokenPath::parse("palette.primary.main").unwrap())
            .unwrap();
        assert_eq!(token.token_type, TokenType::Color);
    }

    #[test]
    fn test_css_variables() {
        let doc = json!({"--color-primary": "#0066ff", "--spacing-md": "16px"});
        let tree = normalize_document(&doc, None).unwrap();

        let color = tree
            .get(&TokenPath::parse("color.primary").unwrap())
            .unwrap();
        assert_eq!(color.token_type, TokenType::Color);

        let spacing = tree.get(&TokenPath::parse("spacing.md").unwrap()).unwrap();
        assert_eq!(spacing.value, TokenValue::Single(json!(16.0)));
    }

    #[test]
    fn test_unrecognized_and_parse_errors() {
        let err = normalize_document(&json!({"random": [1, 2]}), None).unwrap_err();
        assert!(matches!(err, TokenError::UnrecognizedFormat));

        let err = parse_document("{not json").unwrap_err();
        assert!(matches!(err, TokenError::Parse { .. }));
    }
}
