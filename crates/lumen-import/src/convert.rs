//! # Chunked Variable Conversion
//!
//! Turns native collections into canonical per-mode token sets.
//!
//! ## Chunking Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cooperative Conversion                              │
//! │                                                                         │
//! │  unit = one (collection, mode) pair; totals computed up front          │
//! │                                                                         │
//! │  for each unit:                                                         │
//! │    for each CHUNK_SIZE batch of variables:                             │
//! │      convert batch                                                      │
//! │      yield_now().await          ← host UI loop breathes here          │
//! │    completed += 1                                                       │
//! │    on_progress(completed, total, message)   ← monotonic, determinate  │
//! │                                                                         │
//! │  Conversions are not cancellable mid-batch; callers may discard the    │
//! │  in-flight future. Two conversions never run concurrently against     │
//! │  the same collection set.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Per-variable failures (unsupported types, dangling aliases, path
//! collisions) are isolated: the variable is skipped, logged, and recorded on
//! the outcome - they never abort the conversion.

use tracing::{debug, warn};

use lumen_core::normalize::normalize_key;
use lumen_core::{Collection, Mode, Token, TokenPath, TokenSet, TokenTree, TokenType, TokenValue};

use crate::error::{ImportError, ImportResult};
use crate::source::{NativeCollection, NativeValue, NativeVariable, NativeVariableType, VariableSource};

/// Number of variables converted between cooperative yields.
pub const CHUNK_SIZE: usize = 50;

// =============================================================================
// Detection
// =============================================================================

/// Per-collection metadata returned by [`detect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub id: String,
    pub name: String,
    pub variable_count: usize,
    pub modes: Vec<String>,
}

/// Side-effect-free summary of the document's native variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectOutcome {
    pub has_variables: bool,
    pub total_variables: usize,
    pub collections: Vec<CollectionInfo>,
}

/// Reports whether any native variables exist, without converting anything.
pub fn detect(source: &dyn VariableSource) -> ImportResult<DetectOutcome> {
    let collections = source.collections()?;

    let infos: Vec<CollectionInfo> = collections
        .iter()
        .map(|c| CollectionInfo {
            id: c.id.clone(),
            name: c.name.clone(),
            variable_count: c.variable_ids.len(),
            modes: c.modes.iter().map(|m| m.name.clone()).collect(),
        })
        .collect();

    let total_variables = infos.iter().map(|i| i.variable_count).sum();
    Ok(DetectOutcome {
        has_variables: total_variables > 0,
        total_variables,
        collections: infos,
    })
}

// =============================================================================
// Progress
// =============================================================================

/// One progress report: completed and total units plus a display message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportProgress {
    pub completed: usize,
    pub total: usize,
    pub message: String,
}

type ProgressCallback<'a> = &'a (dyn Fn(ImportProgress) + Send + Sync);

// =============================================================================
// Outcome
// =============================================================================

/// A variable the conversion left behind, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedVariable {
    pub name: String,
    pub collection: String,
    pub reason: String,
}

/// Everything one conversion produced.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// One canonical tree per (collection, mode) pair.
    pub sets: Vec<TokenSet>,

    /// Collection metadata (name + mode list) for the converted collections.
    pub collections: Vec<Collection>,

    /// Variables skipped during best-effort conversion.
    pub skipped: Vec<SkippedVariable>,
}

// =============================================================================
// Importer
// =============================================================================

/// Converts native collections into canonical token sets in bounded batches.
#[derive(Debug, Clone)]
pub struct VariableImporter {
    chunk_size: usize,
}

impl Default for VariableImporter {
    fn default() -> Self {
        VariableImporter::new()
    }
}

impl VariableImporter {
    pub fn new() -> VariableImporter {
        VariableImporter {
            chunk_size: CHUNK_SIZE,
        }
    }

    /// Overrides the batch size. Test hook; production uses [`CHUNK_SIZE`].
    pub fn with_chunk_size(chunk_size: usize) -> VariableImporter {
        VariableImporter {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Converts all (or a filtered subset of) collections.
    ///
    /// Progress is reported once per completed (collection, mode) unit and
    /// reaches `completed == total` exactly once per conversion.
    pub async fn convert_to_tokens(
        &self,
        source: &dyn VariableSource,
        on_progress: Option<ProgressCallback<'_>>,
        collection_ids: Option<&[String]>,
    ) -> ImportResult<ImportOutcome> {
        let all_collections = source.collections()?;

        let collections: Vec<NativeCollection> = match collection_ids {
            Some(ids) => {
                for id in ids {
                    if !all_collections.iter().any(|c| &c.id == id) {
                        return Err(ImportError::UnknownCollection(id.clone()));
                    }
                }
                all_collections
                    .into_iter()
                    .filter(|c| ids.contains(&c.id))
                    .collect()
            }
            None => all_collections,
        };

        // Totals up front so callers can render a determinate progress bar.
        let total: usize = collections.iter().map(|c| c.modes.len()).sum();
        let mut completed = 0usize;

        let mut sets = Vec::with_capacity(total);
        let mut skipped = Vec::new();
        let mut collection_meta = Vec::with_capacity(collections.len());

        for collection in &collections {
            let variables = source.variables_in(&collection.id)?;
            debug!(
                collection = %collection.name,
                variables = variables.len(),
                modes = collection.modes.len(),
                "Converting collection"
            );

            collection_meta.push(Collection {
                name: collection.name.clone(),
                modes: collection
                    .modes
                    .iter()
                    .map(|m| Mode {
                        id: m.mode_id.clone(),
                        name: m.name.clone(),
                    })
                    .collect(),
            });

            for mode in &collection.modes {
                let mut tree = TokenTree::new();

                for chunk in variables.chunks(self.chunk_size) {
                    for variable in chunk {
                        match convert_variable(source, collection, variable, &mode.mode_id) {
                            Ok(Some(token)) => {
                                if let Err(e) = tree.insert(token) {
                                    warn!(variable = %variable.name, error = %e, "Skipping variable");
                                    skipped.push(SkippedVariable {
                                        name: variable.name.clone(),
                                        collection: collection.name.clone(),
                                        reason: e.to_string(),
                                    });
                                }
                            }
                            Ok(None) => {
                                // No value for this mode; nothing to record.
                            }
                            Err(reason) => {
                                warn!(variable = %variable.name, %reason, "Skipping variable");
                                skipped.push(SkippedVariable {
                                    name: variable.name.clone(),
                                    collection: collection.name.clone(),
                                    reason,
                                });
                            }
                        }
                    }

                    // Hand control back to the host runtime between batches
                    // so large conversions do not starve the UI loop.
                    tokio::task::yield_now().await;
                }

                sets.push(TokenSet {
                    collection: collection.name.clone(),
                    mode: mode.name.clone(),
                    tree,
                });

                completed += 1;
                if let Some(report) = on_progress {
                    report(ImportProgress {
                        completed,
                        total,
                        message: format!("Converted {} / {}", collection.name, mode.name),
                    });
                }
            }
        }

        Ok(ImportOutcome {
            sets,
            collections: collection_meta,
            skipped,
        })
    }
}

// =============================================================================
// Per-Variable Conversion
// =============================================================================

/// Converts one variable's value for one mode.
///
/// `Ok(None)` means the variable has no value for this mode. `Err(reason)`
/// is a skip, not a failure - the conversion carries on.
fn convert_variable(
    source: &dyn VariableSource,
    collection: &NativeCollection,
    variable: &NativeVariable,
    mode_id: &str,
) -> Result<Option<Token>, String> {
    if variable.resolved_type == NativeVariableType::Unsupported {
        return Err("unsupported variable type".to_string());
    }

    let Some(value) = variable.values_by_mode.get(mode_id) else {
        return Ok(None);
    };

    // Mode-list invariant: every valuesByMode key must be a known mode.
    for key in variable.values_by_mode.keys() {
        if !collection.modes.iter().any(|m| &m.mode_id == key) {
            warn!(
                variable = %variable.name,
                mode = %key,
                "Value for a mode the collection does not declare"
            );
        }
    }

    let path = token_path(&variable.name)?;

    let json_value = match value {
        NativeValue::Color { r, g, b, a } => {
            serde_json::Value::String(rgba_to_hex(*r, *g, *b, *a))
        }
        NativeValue::Alias { id, .. } => {
            // Translate to canonical reference syntax; resolution is
            // deferred to the reference resolver.
            let target = source
                .variable(id)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("alias target '{}' not found", id))?;
            let target_path = token_path(&target.name)?;
            serde_json::Value::String(format!("{{{}}}", target_path.join()))
        }
        NativeValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| format!("non-finite number {}", f))?,
        NativeValue::Text(s) => serde_json::Value::String(s.clone()),
        NativeValue::Boolean(b) => serde_json::Value::Bool(*b),
    };

    let token_type = canonical_type(variable, &path);
    let mut token = Token::new(path, token_type, TokenValue::Single(json_value));
    token.description = variable
        .description
        .as_ref()
        .filter(|d| !d.trim().is_empty())
        .cloned();
    Ok(Some(token))
}

/// Splits a native hierarchical name (`"spacing/md"`, `"color.primary"`)
/// into normalized path segments.
fn token_path(name: &str) -> Result<TokenPath, String> {
    let segments: Vec<String> = name
        .split(['/', '.'])
        .map(normalize_key)
        .filter(|s| !s.is_empty())
        .collect();
    TokenPath::from_segments(segments).map_err(|e| e.to_string())
}

/// Maps a native type onto the canonical type, refining FLOAT variables by
/// path keywords (a float under `spacing/…` is a dimension, not a number).
fn canonical_type(variable: &NativeVariable, path: &TokenPath) -> TokenType {
    match variable.resolved_type {
        NativeVariableType::Color => TokenType::Color,
        NativeVariableType::String => TokenType::String,
        NativeVariableType::Boolean => TokenType::Boolean,
        NativeVariableType::Float => {
            let inferred = TokenType::infer_from_path(path);
            if inferred.is_unit_bearing() {
                inferred
            } else {
                TokenType::Number
            }
        }
        NativeVariableType::Unsupported => TokenType::String,
    }
}

/// Converts the tool's 0..1-normalized RGBA floats to hex.
///
/// Fully opaque colors omit the alpha byte for canonical minimality; any
/// `a < 1` appends it.
pub fn rgba_to_hex(r: f64, g: f64, b: f64, a: f64) -> String {
    let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    if a < 1.0 {
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            channel(r),
            channel(g),
            channel(b),
            channel(a)
        )
    } else {
        format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::NativeMode;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory stand-in for the design tool's variable storage.
    struct FixtureSource {
        collections: Vec<NativeCollection>,
        variables: HashMap<String, Vec<NativeVariable>>,
    }

    impl VariableSource for FixtureSource {
        fn collections(&self) -> ImportResult<Vec<NativeCollection>> {
            Ok(self.collections.clone())
        }

        fn variables_in(&self, collection_id: &str) -> ImportResult<Vec<NativeVariable>> {
            Ok(self.variables.get(collection_id).cloned().unwrap_or_default())
        }

        fn variable(&self, variable_id: &str) -> ImportResult<Option<NativeVariable>> {
            Ok(self
                .variables
                .values()
                .flatten()
                .find(|v| v.id == variable_id)
                .cloned())
        }
    }

    fn color_variable(id: &str, name: &str, modes: &[(&str, f64, f64, f64, f64)]) -> NativeVariable {
        NativeVariable {
            id: id.to_string(),
            name: name.to_string(),
            resolved_type: NativeVariableType::Color,
            values_by_mode: modes
                .iter()
                .map(|(mode, r, g, b, a)| {
                    (
                        mode.to_string(),
                        NativeValue::Color {
                            r: *r,
                            g: *g,
                            b: *b,
                            a: *a,
                        },
                    )
                })
                .collect(),
            description: None,
        }
    }

    fn fixture() -> FixtureSource {
        let theme = NativeCollection {
            id: "col-theme".to_string(),
            name: "Theme".to_string(),
            modes: vec![
                NativeMode {
                    mode_id: "m-light".to_string(),
                    name: "Light".to_string(),
                },
                NativeMode {
                    mode_id: "m-dark".to_string(),
                    name: "Dark".to_string(),
                },
            ],
            variable_ids: vec!["v-primary".to_string(), "v-accent".to_string()],
        };
        let primitives = NativeCollection {
            id: "col-prim".to_string(),
            name: "Primitives".to_string(),
            modes: vec![NativeMode {
                mode_id: "m-default".to_string(),
                name: "Default".to_string(),
            }],
            variable_ids: vec!["v-spacing".to_string()],
        };

        let mut variables = HashMap::new();
        variables.insert(
            "col-theme".to_string(),
            vec![
                color_variable(
                    "v-primary",
                    "color/primary",
                    &[
                        ("m-light", 0.0, 0.4, 1.0, 1.0),
                        ("m-dark", 0.2, 0.53, 1.0, 1.0),
                    ],
                ),
                NativeVariable {
                    id: "v-accent".to_string(),
                    name: "color/accent".to_string(),
                    resolved_type: NativeVariableType::Color,
                    values_by_mode: [
                        (
                            "m-light".to_string(),
                            NativeValue::Alias {
                                marker: "VARIABLE_ALIAS".to_string(),
                                id: "v-primary".to_string(),
                            },
                        ),
                        (
                            "m-dark".to_string(),
                            NativeValue::Color {
                                r: 1.0,
                                g: 0.0,
                                b: 0.0,
                                a: 0.5,
                            },
                        ),
                    ]
                    .into_iter()
                    .collect(),
                    description: Some("Accent color".to_string()),
                },
            ],
        );
        variables.insert(
            "col-prim".to_string(),
            vec![NativeVariable {
                id: "v-spacing".to_string(),
                name: "spacing/md".to_string(),
                resolved_type: NativeVariableType::Float,
                values_by_mode: [("m-default".to_string(), NativeValue::Float(16.0))]
                    .into_iter()
                    .collect(),
                description: None,
            }],
        );

        FixtureSource {
            collections: vec![theme, primitives],
            variables,
        }
    }

    #[test]
    fn test_rgba_to_hex() {
        assert_eq!(rgba_to_hex(1.0, 0.0, 0.0, 1.0), "#ff0000");
        assert_eq!(rgba_to_hex(1.0, 0.0, 0.0, 0.5), "#ff000080");
        assert_eq!(rgba_to_hex(0.0, 0.4, 1.0, 1.0), "#0066ff");
    }

    #[test]
    fn test_detect() {
        let outcome = detect(&fixture()).unwrap();
        assert!(outcome.has_variables);
        assert_eq!(outcome.total_variables, 3);
        assert_eq!(outcome.collections.len(), 2);
        assert_eq!(outcome.collections[0].modes, vec!["Light", "Dark"]);
    }

    #[tokio::test]
    async fn test_convert_produces_one_set_per_collection_mode() {
        let importer = VariableImporter::new();
        let outcome = importer
            .convert_to_tokens(&fixture(), None, None)
            .await
            .unwrap();

        // Theme × {Light, Dark} + Primitives × {Default}
        assert_eq!(outcome.sets.len(), 3);
        assert!(outcome.skipped.is_empty());

        let light = outcome
            .sets
            .iter()
            .find(|s| s.collection == "Theme" && s.mode == "Light")
            .unwrap();
        let primary = light
            .tree
            .get(&TokenPath::parse("color.primary").unwrap())
            .unwrap();
        assert_eq!(
            primary.value,
            TokenValue::Single(serde_json::json!("#0066ff"))
        );

        // Alias translated to reference syntax, NOT eagerly resolved.
        let accent = light
            .tree
            .get(&TokenPath::parse("color.accent").unwrap())
            .unwrap();
        assert_eq!(
            accent.value,
            TokenValue::Single(serde_json::json!("{color.primary}"))
        );

        // Half-transparent red carries the alpha byte.
        let dark = outcome
            .sets
            .iter()
            .find(|s| s.collection == "Theme" && s.mode == "Dark")
            .unwrap();
        let accent = dark
            .tree
            .get(&TokenPath::parse("color.accent").unwrap())
            .unwrap();
        assert_eq!(
            accent.value,
            TokenValue::Single(serde_json::json!("#ff000080"))
        );

        // Float under spacing/ becomes a dimension token.
        let spacing = outcome
            .sets
            .iter()
            .find(|s| s.collection == "Primitives")
            .unwrap();
        let md = spacing
            .tree
            .get(&TokenPath::parse("spacing.md").unwrap())
            .unwrap();
        assert_eq!(md.token_type, TokenType::Dimension);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_reaches_total_once() {
        let reports: Mutex<Vec<ImportProgress>> = Mutex::new(Vec::new());
        let importer = VariableImporter::with_chunk_size(1);

        importer
            .convert_to_tokens(
                &fixture(),
                Some(&|p| reports.lock().unwrap().push(p)),
                None,
            )
            .await
            .unwrap();

        let reports = reports.into_inner().unwrap();
        assert!(!reports.is_empty());

        let mut previous = 0;
        for report in &reports {
            assert!(report.completed >= previous, "progress went backwards");
            assert_eq!(report.total, 3);
            previous = report.completed;
        }

        let finished = reports
            .iter()
            .filter(|r| r.completed == r.total)
            .count();
        assert_eq!(finished, 1);
    }

    #[tokio::test]
    async fn test_collection_filter_and_unknown_id() {
        let importer = VariableImporter::new();

        let outcome = importer
            .convert_to_tokens(&fixture(), None, Some(&["col-prim".to_string()]))
            .await
            .unwrap();
        assert_eq!(outcome.sets.len(), 1);
        assert_eq!(outcome.sets[0].collection, "Primitives");

        let err = importer
            .convert_to_tokens(&fixture(), None, Some(&["col-nope".to_string()]))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UnknownCollection(_)));
    }

    #[tokio::test]
    async fn test_unsupported_variable_is_skipped_not_fatal() {
        let mut source = fixture();
        source.variables.get_mut("col-prim").unwrap().push(NativeVariable {
            id: "v-exotic".to_string(),
            name: "exotic/thing".to_string(),
            resolved_type: NativeVariableType::Unsupported,
            values_by_mode: [("m-default".to_string(), NativeValue::Float(1.0))]
                .into_iter()
                .collect(),
            description: None,
        });

        let importer = VariableImporter::new();
        let outcome = importer
            .convert_to_tokens(&source, None, None)
            .await
            .unwrap();

        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].name, "exotic/thing");
        // The other variables still converted.
        assert_eq!(outcome.sets.len(), 3);
    }
}
