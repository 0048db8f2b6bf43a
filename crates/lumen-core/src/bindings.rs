//! # Token-Binding Generator
//!
//! Maps canonical tokens to style-variable names and utility-class
//! expressions for the styling framework.
//!
//! ## Binding Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Token                      Variable                Utility             │
//! │  ──────────────────────     ─────────────────────   ──────────────────  │
//! │  semantic.background        --color-semantic-       bg-[var(--color-    │
//! │  (color)                    background              semantic-background)]│
//! │                                                                         │
//! │  spacing.padding.md         --size-spacing-         p-[var(--size-      │
//! │  (dimension)                padding-md              spacing-padding-md)]│
//! │                                                                         │
//! │  typography.font-size.body  --font-size-typography- text-[length:var(   │
//! │  (fontSize)                 font-size-body          --font-size-…)]     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Purely a lookup/formatting function. Correctness requirements are
//! determinism (same token, same binding) and totality (every token gets its
//! type's default prefix when no path keyword matches).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::token::{Token, TokenType};

// =============================================================================
// Binding
// =============================================================================

/// The generated pair for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBinding {
    /// CSS custom property name (`--{type-prefix}-{path-with-dashes}`).
    pub variable: String,

    /// Utility-class expression embedding the variable.
    pub utility: String,
}

// =============================================================================
// Lookup Tables
// =============================================================================

/// Fixed type → CSS variable prefix table.
pub fn type_prefix(token_type: TokenType) -> &'static str {
    match token_type {
        TokenType::Color => "color",
        TokenType::Dimension => "size",
        TokenType::String => "text",
        TokenType::Number => "number",
        TokenType::Boolean => "flag",
        TokenType::FontSize => "font-size",
        TokenType::FontWeight => "font-weight",
        TokenType::LineHeight => "line-height",
        TokenType::Shadow => "shadow",
        TokenType::Duration => "duration",
        TokenType::BorderRadius => "radius",
        TokenType::BorderWidth => "border-width",
    }
}

/// Per-type `{path keyword → utility prefix}` rules plus the type default.
/// The first keyword found in the path wins; no match falls to the default.
fn utility_rules(token_type: TokenType) -> (&'static [(&'static str, &'static str)], &'static str) {
    match token_type {
        TokenType::Color => (
            &[
                ("background", "bg"),
                ("border", "border"),
                ("text", "text"),
                ("font", "text"),
            ],
            "bg",
        ),
        TokenType::Dimension => (
            &[
                ("padding", "p"),
                ("margin", "m"),
                ("gap", "gap"),
                ("width", "w"),
                ("height", "h"),
            ],
            "p",
        ),
        TokenType::BorderRadius => (&[], "rounded"),
        TokenType::BorderWidth => (&[], "border"),
        TokenType::FontWeight => (&[], "font"),
        TokenType::LineHeight => (&[], "leading"),
        TokenType::Shadow => (&[], "shadow"),
        TokenType::Duration => (&[], "duration"),
        TokenType::Number => (&[("opacity", "opacity"), ("z-index", "z")], "opacity"),
        TokenType::String => (&[], "font"),
        TokenType::Boolean => (&[], "flag"),
        // fontSize is special-cased in utility_class and never reaches here.
        TokenType::FontSize => (&[], "text"),
    }
}

// =============================================================================
// Generation
// =============================================================================

/// Deterministic style-variable name for a token.
pub fn css_variable_name(token: &Token) -> String {
    format!(
        "--{}-{}",
        type_prefix(token.token_type),
        token.path.join_dashed()
    )
}

/// Utility-class expression embedding a style variable.
///
/// `fontSize` takes the longer `text-[length:var(…)]` form so the utility is
/// not mistaken for a text-color utility.
pub fn utility_class(token: &Token, variable: &str) -> String {
    if token.token_type == TokenType::FontSize {
        return format!("text-[length:var({})]", variable);
    }

    let (rules, default) = utility_rules(token.token_type);
    let prefix = rules
        .iter()
        .find(|(keyword, _)| token.path.contains_keyword(keyword))
        .map(|(_, prefix)| *prefix)
        .unwrap_or(default);

    format!("{}-[var({})]", prefix, variable)
}

/// Generates a binding for every token in a flattened map.
///
/// `BTreeMap` in, `BTreeMap` out: iteration order, and therefore output, is
/// identical across runs.
pub fn generate_bindings(flat: &BTreeMap<String, Token>) -> BTreeMap<String, TokenBinding> {
    flat.iter()
        .map(|(path, token)| {
            let variable = css_variable_name(token);
            let utility = utility_class(token, &variable);
            (path.clone(), TokenBinding { variable, utility })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{TokenPath, TokenValue};
    use serde_json::json;

    fn token(path: &str, token_type: TokenType) -> Token {
        Token::new(
            TokenPath::parse(path).unwrap(),
            token_type,
            TokenValue::Single(json!("#000000")),
        )
    }

    #[test]
    fn test_variable_names() {
        let t = token("semantic.background", TokenType::Color);
        assert_eq!(css_variable_name(&t), "--color-semantic-background");

        let t = token("typography.body", TokenType::FontSize);
        assert_eq!(css_variable_name(&t), "--font-size-typography-body");
    }

    #[test]
    fn test_color_keyword_rules() {
        let t = token("semantic.background.raised", TokenType::Color);
        let v = css_variable_name(&t);
        assert_eq!(utility_class(&t, &v), format!("bg-[var({})]", v));

        let t = token("semantic.border.subtle", TokenType::Color);
        let v = css_variable_name(&t);
        assert_eq!(utility_class(&t, &v), format!("border-[var({})]", v));

        // No keyword match falls to the color default.
        let t = token("brand.primary", TokenType::Color);
        let v = css_variable_name(&t);
        assert_eq!(utility_class(&t, &v), format!("bg-[var({})]", v));
    }

    #[test]
    fn test_font_size_long_form() {
        let t = token("typography.font-size.body", TokenType::FontSize);
        let v = css_variable_name(&t);
        assert_eq!(
            utility_class(&t, &v),
            format!("text-[length:var({})]", v)
        );
    }

    #[test]
    fn test_totality_on_unknown_keywords() {
        // Every type must produce a binding even with no recognizable keyword.
        for token_type in [
            TokenType::Color,
            TokenType::Dimension,
            TokenType::String,
            TokenType::Number,
            TokenType::Boolean,
            TokenType::FontSize,
            TokenType::FontWeight,
            TokenType::LineHeight,
            TokenType::Shadow,
            TokenType::Duration,
            TokenType::BorderRadius,
            TokenType::BorderWidth,
        ] {
            let t = token("misc.thing", token_type);
            let v = css_variable_name(&t);
            assert!(!utility_class(&t, &v).is_empty());
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut flat = BTreeMap::new();
        for (path, token_type) in [
            ("color.primary", TokenType::Color),
            ("spacing.padding.md", TokenType::Dimension),
            ("typography.font-size.body", TokenType::FontSize),
        ] {
            flat.insert(path.to_string(), token(path, token_type));
        }

        let first = generate_bindings(&flat);
        let second = generate_bindings(&flat);
        assert_eq!(
            format!("{:?}", first),
            format!("{:?}", second),
            "same token map must yield byte-identical output"
        );
    }
}
