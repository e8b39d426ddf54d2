use serde_json::{Map, Value};

/// Substring the analysis service puts in `error` when the input is not a legal document.
pub const DEFAULT_REJECTION_MARKER: &str = "not related to a Legal Document";

/// Values of a `kind` field that mark a rejection without relying on the marker phrase.
const REJECTION_KINDS: [&str; 2] = ["rejected", "not_legal"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTerm {
    pub term: String,
    pub explanation: String,
}

/// Classified result of one analysis submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisReport {
    /// The service judged the input not to be a legal document.
    Rejected { message: String },
    Structured {
        summary: String,
        risks: Vec<String>,
        key_terms: Vec<KeyTerm>,
    },
    /// Free-form body, shown as-is.
    PlainText { body: String },
}

impl AnalysisReport {
    pub fn is_rejection(&self) -> bool {
        matches!(self, AnalysisReport::Rejected { .. })
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            AnalysisReport::Rejected { .. } => "rejected",
            AnalysisReport::Structured { .. } => "structured",
            AnalysisReport::PlainText { .. } => "plain",
        }
    }

    /// Readable text form used for terminal display and export.
    pub fn render_text(&self) -> String {
        match self {
            AnalysisReport::Rejected { message } => format!(
                "This does not look like a legal document.\n{message}\n\nPlease try again with a legal document.\n"
            ),
            AnalysisReport::Structured {
                summary,
                risks,
                key_terms,
            } => {
                let mut out = String::new();
                out.push_str("Plain-English Summary\n");
                out.push_str(summary);
                out.push_str("\n\nRed Flags & Risks\n");
                for risk in risks {
                    out.push_str("  - ");
                    out.push_str(risk);
                    out.push('\n');
                }
                out.push_str("\nKey Terms Explained\n");
                for key_term in key_terms {
                    out.push_str(&format!("  {}: {}\n", key_term.term, key_term.explanation));
                }
                out
            }
            AnalysisReport::PlainText { body } => {
                let mut out = body.clone();
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out
            }
        }
    }
}

/// Rules the classifier applies to a raw service response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierRules {
    pub rejection_marker: String,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            rejection_marker: DEFAULT_REJECTION_MARKER.to_string(),
        }
    }
}

/// Total classification of a raw analysis response; never fails.
///
/// Order: non-JSON is plain text, then rejection, then the full structured
/// shape, and anything else falls back to the raw text.
pub fn classify(raw: &str, rules: &ClassifierRules) -> AnalysisReport {
    let plain = || AnalysisReport::PlainText {
        body: raw.to_string(),
    };

    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => return plain(),
    };
    let Some(object) = parsed.as_object() else {
        return plain();
    };

    if let Some(message) = rejection_message(object, rules) {
        return AnalysisReport::Rejected { message };
    }

    structured(object).unwrap_or_else(plain)
}

fn rejection_message(object: &Map<String, Value>, rules: &ClassifierRules) -> Option<String> {
    let error = object.get("error")?.as_str()?;

    let flagged_by_kind = object
        .get("kind")
        .and_then(Value::as_str)
        .is_some_and(|kind| REJECTION_KINDS.iter().any(|k| k.eq_ignore_ascii_case(kind)));
    let marker = rules.rejection_marker.to_lowercase();
    let flagged_by_marker = !marker.is_empty() && error.to_lowercase().contains(&marker);

    (flagged_by_kind || flagged_by_marker).then(|| error.to_string())
}

fn structured(object: &Map<String, Value>) -> Option<AnalysisReport> {
    let summary = object.get("summary")?.as_str()?.to_string();
    let risks = object
        .get("risks")?
        .as_array()?
        .iter()
        .map(|risk| risk.as_str().map(ToOwned::to_owned))
        .collect::<Option<Vec<_>>>()?;
    let key_terms = key_terms(object.get("keyTerms")?)?;

    Some(AnalysisReport::Structured {
        summary,
        risks,
        key_terms,
    })
}

/// Accepts `[{"term": .., "explanation": ..}]` or the older `{"term": "explanation"}` map.
fn key_terms(value: &Value) -> Option<Vec<KeyTerm>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let item = item.as_object()?;
                Some(KeyTerm {
                    term: item.get("term")?.as_str()?.to_string(),
                    explanation: item.get("explanation")?.as_str()?.to_string(),
                })
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(term, explanation)| {
                Some(KeyTerm {
                    term: term.clone(),
                    explanation: explanation.as_str()?.to_string(),
                })
            })
            .collect(),
        _ => None,
    }
}
