//! # Native Variable Model
//!
//! Mirror of the design tool's variable API shape, plus the `VariableSource`
//! seam the importer consumes.
//!
//! The pipeline only READS variables; writing back to the tool is out of
//! scope, so the seam has no mutation methods.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ImportResult;

// =============================================================================
// Native Types
// =============================================================================

/// A mode of a native collection (e.g. "Light" / "Dark").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeMode {
    pub mode_id: String,
    pub name: String,
}

/// A native variable collection: an ordered mode list plus its variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCollection {
    pub id: String,
    pub name: String,
    pub modes: Vec<NativeMode>,
    pub variable_ids: Vec<String>,
}

/// The type the design tool resolved for a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NativeVariableType {
    Color,
    Float,
    String,
    Boolean,
    /// Anything this pipeline does not understand. Variables of this type
    /// are skipped, not fatal.
    #[serde(other)]
    Unsupported,
}

/// One per-mode value of a native variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NativeValue {
    /// 0..1-normalized RGBA floats, the tool's native color encoding.
    Color { r: f64, g: f64, b: f64, a: f64 },

    /// A native "variable alias" marker pointing at another variable.
    Alias {
        #[serde(rename = "type")]
        marker: String,
        id: String,
    },

    Float(f64),
    Text(String),
    Boolean(bool),
}

/// A native variable: hierarchical name, resolved type, per-mode values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeVariable {
    pub id: String,

    /// Hierarchical name, segments separated by `/` or `.`
    /// (`"spacing/md"`, `"color.primary"`).
    pub name: String,

    pub resolved_type: NativeVariableType,

    /// Values keyed by mode id. Every key must exist in the owning
    /// collection's mode list.
    pub values_by_mode: HashMap<String, NativeValue>,

    pub description: Option<String>,
}

// =============================================================================
// Variable Source Seam
// =============================================================================

/// Read-only access to the design tool's variable storage.
///
/// The host plugin boundary marshals this data synchronously; the importer's
/// chunked async processing sits on top.
pub trait VariableSource: Send + Sync {
    /// All variable collections in the document.
    fn collections(&self) -> ImportResult<Vec<NativeCollection>>;

    /// The variables belonging to one collection.
    fn variables_in(&self, collection_id: &str) -> ImportResult<Vec<NativeVariable>>;

    /// Looks up a single variable by id (used to translate alias targets).
    fn variable(&self, variable_id: &str) -> ImportResult<Option<NativeVariable>>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_value_deserializes_color_and_alias() {
        let color: NativeValue =
            serde_json::from_str(r#"{"r": 1.0, "g": 0.0, "b": 0.0, "a": 1.0}"#).unwrap();
        assert!(matches!(color, NativeValue::Color { .. }));

        let alias: NativeValue =
            serde_json::from_str(r#"{"type": "VARIABLE_ALIAS", "id": "VariableID:1:5"}"#).unwrap();
        match alias {
            NativeValue::Alias { marker, id } => {
                assert_eq!(marker, "VARIABLE_ALIAS");
                assert_eq!(id, "VariableID:1:5");
            }
            other => panic!("expected alias, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_resolved_type_maps_to_unsupported() {
        let parsed: NativeVariableType = serde_json::from_str(r#""EXOTIC_NEW_KIND""#).unwrap();
        assert_eq!(parsed, NativeVariableType::Unsupported);
    }
}
