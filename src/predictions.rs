//! Confidence-ranked field picking for label/score prediction lists
//! (Nanonets-style `result[*].prediction` responses).

use serde::Serialize;
use serde_json::Value;

use crate::labels::{self, Field};
use crate::patterns::{self, scalar_text};
use crate::schema::ExtractionResult;

/// Predictions scoring below this are ignored unless configured otherwise.
pub const DEFAULT_MIN_SCORE: f64 = 0.55;

/// One labelled text span from a provider, with optional confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateField {
    pub label: String,
    pub text: String,
    pub score: Option<f64>,
}

impl CandidateField {
    /// Normalize a raw prediction entry. Returns `None` for non-objects.
    fn from_prediction(entry: &Value) -> Option<Self> {
        let obj = entry.as_object()?;
        let label = obj
            .get("label")
            .and_then(scalar_text)
            .unwrap_or_default()
            .to_lowercase();
        let text = ["ocr_text", "text"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(scalar_text))
            .unwrap_or_default();
        let score = obj
            .get("score")
            .and_then(Value::as_f64)
            .or_else(|| obj.get("confidence").and_then(Value::as_f64));
        Some(Self { label, text, score })
    }
}

/// Scores behind each picked field. `None` when the field was not picked
/// or its candidate carried no score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Confidences {
    pub first_name: Option<f64>,
    pub last_name: Option<f64>,
    /// For a name composed from parts: the lower of the part scores, an
    /// unscored part counting as 1.
    pub full_name: Option<f64>,
    pub id_number: Option<f64>,
    pub document_type: Option<f64>,
}

/// Fields picked from a prediction list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PickedIdentity {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub id_number: Option<String>,
    pub document_type: Option<String>,
    pub confidences: Confidences,
    /// Every normalized candidate, returned for debugging.
    pub fields: Vec<CandidateField>,
}

impl From<PickedIdentity> for ExtractionResult {
    fn from(picked: PickedIdentity) -> Self {
        ExtractionResult {
            name: picked.full_name,
            id_number: picked.id_number,
            id_type: picked.document_type,
        }
    }
}

/// Flatten all per-page predictions out of a response.
pub fn collect_predictions(response: &Value) -> Vec<CandidateField> {
    let pages = response
        .get("result")
        .filter(|v| !v.is_null())
        .or_else(|| response.get("data").and_then(|d| d.get("result")))
        .and_then(Value::as_array);

    let Some(pages) = pages else {
        return Vec::new();
    };

    pages
        .iter()
        .filter_map(|page| {
            page.get("prediction")
                .and_then(Value::as_array)
                .or_else(|| page.get("predictions").and_then(Value::as_array))
        })
        .flatten()
        .filter_map(CandidateField::from_prediction)
        .collect()
}

/// Highest-scoring candidate whose label is one of `field`'s labels.
/// Candidates without a score rank as 0 but are never filtered out; ties
/// keep the earlier candidate.
fn pick_best(candidates: &[CandidateField], field: Field, min_score: f64) -> Option<&CandidateField> {
    let wanted = labels::prediction_labels(field);
    let mut best: Option<&CandidateField> = None;

    for candidate in candidates {
        if candidate.text.is_empty() {
            continue;
        }
        if candidate.score.is_some_and(|s| s < min_score) {
            continue;
        }
        if !wanted.contains(&candidate.label.as_str()) {
            continue;
        }
        let better = match best {
            None => true,
            Some(current) => candidate.score.unwrap_or(0.0) > current.score.unwrap_or(0.0),
        };
        if better {
            best = Some(candidate);
        }
    }

    best
}

/// Guess the document family from the words found anywhere on the card.
fn infer_document_type(candidates: &[CandidateField]) -> Option<String> {
    let all_text = candidates
        .iter()
        .map(|c| c.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let guess = if all_text.contains("aadhaar") {
        "Aadhaar"
    } else if patterns::PAN_WORD.is_match(&all_text) {
        "PAN"
    } else if all_text.contains("passport") {
        "Passport"
    } else if all_text.contains("nric") || all_text.contains("singapore") {
        "Singapore NRIC"
    } else {
        return None;
    };
    Some(guess.to_string())
}

/// Pick name, ID number and document type from normalized candidates.
pub fn pick_identity(candidates: Vec<CandidateField>, min_score: f64) -> PickedIdentity {
    let best = |field| pick_best(&candidates, field, min_score).cloned();

    let first = best(Field::FirstName);
    let last = best(Field::LastName);
    let full = best(Field::FullName);
    let id = best(Field::IdNumber);
    let doc_type = best(Field::DocumentType);

    let (full_name, full_name_score) = match &full {
        Some(c) => (Some(c.text.clone()), c.score),
        None => compose_full_name(first.as_ref(), last.as_ref()),
    };

    let document_type = doc_type
        .as_ref()
        .map(|c| c.text.clone())
        .or_else(|| infer_document_type(&candidates));

    let confidences = Confidences {
        first_name: first.as_ref().and_then(|c| c.score),
        last_name: last.as_ref().and_then(|c| c.score),
        full_name: full_name_score,
        id_number: id.as_ref().and_then(|c| c.score),
        document_type: doc_type.as_ref().and_then(|c| c.score),
    };

    PickedIdentity {
        first_name: first.map(|c| c.text),
        last_name: last.map(|c| c.text),
        full_name,
        id_number: id.map(|c| c.text),
        document_type,
        confidences,
        fields: candidates,
    }
}

/// Join first and last name parts, collapsing inner whitespace.
fn compose_full_name(
    first: Option<&CandidateField>,
    last: Option<&CandidateField>,
) -> (Option<String>, Option<f64>) {
    let composed = [first, last]
        .into_iter()
        .flatten()
        .flat_map(|c| c.text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");
    if composed.is_empty() {
        return (None, None);
    }
    let part_score = |c: Option<&CandidateField>| c.and_then(|c| c.score).unwrap_or(1.0);
    (Some(composed), Some(part_score(first).min(part_score(last))))
}

/// Collect predictions from a raw response and pick identity fields.
pub fn pick_from_response(response: &Value, min_score: f64) -> PickedIdentity {
    pick_identity(collect_predictions(response), min_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(label: &str, text: &str, score: Option<f64>) -> CandidateField {
        CandidateField {
            label: label.to_string(),
            text: text.to_string(),
            score,
        }
    }

    #[test]
    fn test_collect_predictions_from_pages() {
        let response = json!({
            "result": [
                {"prediction": [{"label": " Full_Name ", "ocr_text": " Jane Roe ", "score": 0.9}]},
                {"predictions": [{"label": "id_number", "text": "X1", "confidence": 0.7}]},
                {"other": []}
            ]
        });
        let fields = collect_predictions(&response);
        assert_eq!(
            fields,
            vec![
                candidate("full_name", "Jane Roe", Some(0.9)),
                candidate("id_number", "X1", Some(0.7)),
            ]
        );
    }

    #[test]
    fn test_collect_predictions_under_data() {
        let response = json!({"data": {"result": [{"prediction": [{"label": "name", "ocr_text": "A"}]}]}});
        assert_eq!(collect_predictions(&response).len(), 1);
        assert!(collect_predictions(&json!({"result": "nope"})).is_empty());
    }

    #[test]
    fn test_highest_score_wins() {
        let picked = pick_identity(
            vec![
                candidate("id_number", "LOW", Some(0.6)),
                candidate("passport_number", "HIGH", Some(0.95)),
                candidate("card_number", "MID", Some(0.8)),
            ],
            DEFAULT_MIN_SCORE,
        );
        assert_eq!(picked.id_number.as_deref(), Some("HIGH"));
    }

    #[test]
    fn test_equal_scores_keep_earlier_candidate() {
        let picked = pick_identity(
            vec![
                candidate("id_number", "FIRST", Some(0.9)),
                candidate("card_number", "SECOND", Some(0.9)),
            ],
            DEFAULT_MIN_SCORE,
        );
        assert_eq!(picked.id_number.as_deref(), Some("FIRST"));
        assert_eq!(picked.confidences.id_number, Some(0.9));
    }

    #[test]
    fn test_below_min_score_is_dropped() {
        let picked = pick_identity(
            vec![candidate("id_number", "NOISE", Some(0.3))],
            DEFAULT_MIN_SCORE,
        );
        assert!(picked.id_number.is_none());
    }

    #[test]
    fn test_unscored_candidate_is_kept_but_loses_ties() {
        let picked = pick_identity(
            vec![
                candidate("surname", "Unscored", None),
                candidate("last_name", "Scored", Some(0.6)),
            ],
            DEFAULT_MIN_SCORE,
        );
        assert_eq!(picked.last_name.as_deref(), Some("Scored"));

        let picked = pick_identity(vec![candidate("surname", "Only", None)], DEFAULT_MIN_SCORE);
        assert_eq!(picked.last_name.as_deref(), Some("Only"));
    }

    #[test]
    fn test_full_name_composed_from_parts() {
        let picked = pick_identity(
            vec![
                candidate("given_name", "Mary  Ann", Some(0.9)),
                candidate("family_name", "Smith", Some(0.9)),
            ],
            DEFAULT_MIN_SCORE,
        );
        assert_eq!(picked.full_name.as_deref(), Some("Mary Ann Smith"));
        assert_eq!(picked.first_name.as_deref(), Some("Mary  Ann"));

        let picked = pick_identity(vec![candidate("surname", "Solo", None)], DEFAULT_MIN_SCORE);
        assert_eq!(picked.full_name.as_deref(), Some("Solo"));
    }

    #[test]
    fn test_confidences() {
        let picked = pick_identity(
            vec![
                candidate("first_name", "Li", Some(0.92)),
                candidate("last_name", "Wei", Some(0.71)),
                candidate("nric", "S1234567D", Some(0.97)),
            ],
            DEFAULT_MIN_SCORE,
        );
        assert_eq!(
            picked.confidences,
            Confidences {
                first_name: Some(0.92),
                last_name: Some(0.71),
                full_name: Some(0.71),
                id_number: Some(0.97),
                document_type: None,
            }
        );

        let picked = pick_identity(
            vec![candidate("given_name", "Li", Some(0.8))],
            DEFAULT_MIN_SCORE,
        );
        assert_eq!(picked.confidences.full_name, Some(0.8));

        let picked = pick_identity(
            vec![candidate("full_name", "Jane Roe", None)],
            DEFAULT_MIN_SCORE,
        );
        assert_eq!(picked.full_name.as_deref(), Some("Jane Roe"));
        assert_eq!(picked.confidences.full_name, None);
    }

    #[test]
    fn test_document_type_inferred_from_text() {
        let picked = pick_identity(
            vec![candidate("header", "Unique Identification Authority - Aadhaar", None)],
            DEFAULT_MIN_SCORE,
        );
        assert_eq!(picked.document_type.as_deref(), Some("Aadhaar"));

        let picked = pick_identity(
            vec![candidate("header", "Company Registration", None)],
            DEFAULT_MIN_SCORE,
        );
        assert!(picked.document_type.is_none());

        let picked = pick_identity(
            vec![candidate("header", "Republic of Singapore", None)],
            DEFAULT_MIN_SCORE,
        );
        assert_eq!(picked.document_type.as_deref(), Some("Singapore NRIC"));
    }

    #[test]
    fn test_explicit_document_type_beats_inference() {
        let picked = pick_identity(
            vec![
                candidate("doctype", "Passport", Some(0.9)),
                candidate("header", "aadhaar", None),
            ],
            DEFAULT_MIN_SCORE,
        );
        assert_eq!(picked.document_type.as_deref(), Some("Passport"));
    }

    #[test]
    fn test_into_extraction_result() {
        let response = json!({"result": [{"prediction": [
            {"label": "full_name", "ocr_text": "Jane Roe", "score": 0.9},
            {"label": "id_number", "ocr_text": "P7654321", "score": 0.88},
            {"label": "document_type", "ocr_text": "Passport", "score": 0.8}
        ]}]});
        let result: ExtractionResult = pick_from_response(&response, DEFAULT_MIN_SCORE).into();
        assert_eq!(
            result,
            ExtractionResult {
                name: Some("Jane Roe".to_string()),
                id_number: Some("P7654321".to_string()),
                id_type: Some("Passport".to_string()),
            }
        );
    }
}
