//! Projection of raw scheme records into the program shape listings use.
//!
//! Total by construction: every field has a default, so any record, even an
//! empty one, produces a program.

use serde::Serialize;
use serde_json::Value;

use crate::session::Scheme;

pub const DEFAULT_TITLE: &str = "Support scheme";
pub const DEFAULT_DESCRIPTION: &str = "This support may help with costs related to your situation.";
pub const DEFAULT_CATEGORY: &str = "Municipal support";
/// Minutes, when the scheme does not say.
pub const DEFAULT_APPLICATION_TIME: f64 = 30.0;
/// Weeks. The remote payload has no field for this.
pub const DEFAULT_PROCESSING_TIME: u32 = 4;
/// Stands in for a missing id.
pub const MISSING_ID: &str = "undefined";

/// How likely the user is to qualify.
///
/// Schemes carry no confidence signal, so every program lands in the middle tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Medium,
}

impl Confidence {
    /// Translation key of the tier's display label.
    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Medium => "programs.confidence.medium",
        }
    }
}

/// A normalized, display-ready program.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub confidence: Confidence,
    pub application_time: f64,
    pub processing_time: u32,
}

/// Map one scheme record to a program.
pub fn project_scheme(scheme: &Scheme) -> Program {
    Program {
        id: scheme.get("id").map_or_else(|| MISSING_ID.to_string(), stringify),
        title: text_or(scheme.get("name"), DEFAULT_TITLE),
        description: text_or(scheme.get("description"), DEFAULT_DESCRIPTION),
        category: text_or(scheme.get("source"), DEFAULT_CATEGORY),
        confidence: Confidence::Medium,
        application_time: scheme
            .get("time_to_apply_min")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_APPLICATION_TIME),
        processing_time: DEFAULT_PROCESSING_TIME,
    }
}

pub fn project_schemes(schemes: &[Scheme]) -> Vec<Program> {
    schemes.iter().map(project_scheme).collect()
}

/// Null and absent fall back; any other value is shown as text.
fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(v) => stringify(v),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
