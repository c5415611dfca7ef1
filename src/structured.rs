//! Field extraction from provider JSON of unknown shape.
//!
//! Pure functions, no async. Each vendor nests its payload differently, so the
//! extractor probes a fixed, ordered list of container locations and lets the
//! first container that yields a value win each field. A regex scan over the
//! serialized payload is kept as a separate last-resort stage.

use serde_json::{Map, Value};
use tracing::debug;

use crate::labels::{self, EntryShape, Field, RESULT_FIELDS};
use crate::patterns::{self, scalar_text};
use crate::schema::ExtractionResult;

/// A place inside the response where a vendor may put its parsed fields.
#[derive(Debug, Clone, Copy)]
enum ContainerProbe {
    Root,
    Key(&'static str),
    FirstOf(&'static str),
}

/// Probe order. Earlier containers win.
const CONTAINER_PROBES: [ContainerProbe; 7] = [
    ContainerProbe::Root,
    ContainerProbe::Key("data"),
    ContainerProbe::Key("result"),
    ContainerProbe::FirstOf("results"),
    ContainerProbe::Key("parsed"),
    ContainerProbe::FirstOf("predictions"),
    ContainerProbe::FirstOf("documents"),
];

impl ContainerProbe {
    /// Resolve this probe against the response root. Only objects qualify.
    fn locate(self, root: &Value) -> Option<&Map<String, Value>> {
        let found = match self {
            Self::Root => Some(root),
            Self::Key(key) => root.get(key),
            Self::FirstOf(key) => root.get(key).and_then(|list| list.get(0)),
        }?;
        found.as_object()
    }
}

/// Whether the serialized-payload regex scan runs when no ID was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackScan {
    #[default]
    Enabled,
    Disabled,
}

/// Configurable structured extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredExtractor {
    pub fallback: FallbackScan,
}

impl StructuredExtractor {
    pub fn new(fallback: FallbackScan) -> Self {
        Self { fallback }
    }

    /// Extract name, ID number and ID type. Never fails; an all-`None`
    /// result means nothing was recognized.
    pub fn extract(&self, response: &Value) -> ExtractionResult {
        let mut result = ExtractionResult::default();

        for probe in CONTAINER_PROBES {
            let Some(container) = probe.locate(response) else {
                continue;
            };

            fill_from_direct_keys(container, &mut result);
            fill_from_entries(container, &labels::FIELDS_LIST, &mut result);
            fill_from_entries(container, &labels::KEY_VALUES_LIST, &mut result);
        }

        if result.id_number.is_none() && self.fallback == FallbackScan::Enabled {
            result.id_number = scan_serialized(response);
            if let Some(id) = &result.id_number {
                debug!("Structured extractor: id_number '{}' from fallback scan", id);
            }
        }

        finish(result)
    }
}

fn slot(result: &mut ExtractionResult, field: Field) -> Option<&mut Option<String>> {
    match field {
        Field::FullName => Some(&mut result.name),
        Field::IdNumber => Some(&mut result.id_number),
        Field::DocumentType => Some(&mut result.id_type),
        Field::FirstName | Field::LastName => None,
    }
}

fn fill_from_direct_keys(container: &Map<String, Value>, result: &mut ExtractionResult) {
    for field in RESULT_FIELDS {
        let Some(target) = slot(result, field) else {
            continue;
        };
        if target.is_some() {
            continue;
        }
        *target = labels::direct_keys(field)
            .iter()
            .find_map(|key| container.get(*key).and_then(scalar_text));
    }
}

/// Scan a label/value list, assigning each entry to every still-unset field
/// whose hints its label contains.
fn fill_from_entries(
    container: &Map<String, Value>,
    shape: &EntryShape,
    result: &mut ExtractionResult,
) {
    let Some(entries) = container.get(shape.list_key).and_then(Value::as_array) else {
        return;
    };

    for entry in entries {
        let label = first_text(entry, shape.label_keys)
            .unwrap_or_default()
            .to_lowercase();
        let Some(value) = first_text(entry, shape.value_keys) else {
            continue;
        };

        for field in RESULT_FIELDS {
            if !labels::label_matches(field, &label) {
                continue;
            }
            if let Some(target) = slot(result, field) {
                if target.is_none() {
                    *target = Some(value.clone());
                }
            }
        }
    }
}

fn first_text(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| entry.get(*key).and_then(scalar_text))
}

/// Best-effort ID scan over the serialized payload: PAN shape, then passport
/// shape, then any long uppercase token. Low precision.
fn scan_serialized(response: &Value) -> Option<String> {
    let text = response.to_string();
    [
        &*patterns::PAN,
        &*patterns::LOOSE_PASSPORT,
        &*patterns::LOOSE_TOKEN,
    ]
    .iter()
    .find_map(|re| re.find(&text))
    .map(|m| m.as_str().to_string())
}

fn finish(result: ExtractionResult) -> ExtractionResult {
    let clean = |v: Option<String>| {
        v.map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    ExtractionResult {
        name: clean(result.name),
        id_number: clean(result.id_number),
        id_type: clean(result.id_type),
    }
}
