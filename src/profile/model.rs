//! Eligibility profile data model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The fields a profile needs before eligibility can be judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequiredField {
    IsSingleParent,
    NumberOfChildren,
    NetIncome,
    SavingsAssets,
    Municipality,
}

impl RequiredField {
    /// All required fields, in display order.
    pub const ALL: [RequiredField; 5] = [
        RequiredField::IsSingleParent,
        RequiredField::NumberOfChildren,
        RequiredField::NetIncome,
        RequiredField::SavingsAssets,
        RequiredField::Municipality,
    ];

    /// Name of the field in the stored and remote JSON mapping.
    pub fn key(&self) -> &'static str {
        match self {
            Self::IsSingleParent => "isSingleParent",
            Self::NumberOfChildren => "numberOfChildren",
            Self::NetIncome => "netIncome",
            Self::SavingsAssets => "savingsAssets",
            Self::Municipality => "municipality",
        }
    }

    /// Translation key of the field's display label.
    pub fn label_key(&self) -> String {
        format!("profile.fields.{}", self.key())
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A scalar profile value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl FieldValue {
    /// Interpret free-form user input: booleans, then whole numbers, then text.
    pub fn parse_input(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "ja" => return Self::Bool(true),
            "false" | "no" | "nee" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Self::Integer(n);
        }
        Self::Text(trimmed.to_string())
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Decimal)),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// An empty string counts as "not provided".
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Decimal(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Completion count over the required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileProgress {
    pub completed: usize,
    pub total: usize,
}

/// Field name → scalar mapping. Unset fields are absent, never null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EligibilityProfile {
    fields: BTreeMap<String, FieldValue>,
}

impl EligibilityProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in profile used when nothing usable is stored.
    pub fn demo() -> Self {
        let mut profile = Self::new();
        profile.set(RequiredField::IsSingleParent.key(), true);
        profile.set(RequiredField::NumberOfChildren.key(), 2);
        profile.set(RequiredField::NetIncome.key(), 2500);
        profile.set(RequiredField::SavingsAssets.key(), 5000);
        profile.set(RequiredField::Municipality.key(), "Amsterdam");
        profile
    }

    /// Build from a loosely-typed JSON object, dropping nulls and non-scalars.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let fields = object
            .iter()
            .filter_map(|(k, v)| FieldValue::from_json(v).map(|v| (k.clone(), v)))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All fields in key order, required or not.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether a required field holds a non-blank value.
    pub fn is_filled(&self, field: RequiredField) -> bool {
        self.get(field.key()).is_some_and(|v| !v.is_blank())
    }

    pub fn completed_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|f| self.is_filled(*f))
            .collect()
    }

    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|f| !self.is_filled(*f))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn progress(&self) -> ProfileProgress {
        ProfileProgress {
            completed: self.completed_fields().len(),
            total: RequiredField::ALL.len(),
        }
    }
}
