//! Translation lookup: dotted keys resolved against nested locale dictionaries.
//!
//! Lookups never fail. A key that is missing, that walks into a non-object, or
//! that ends on a non-string leaf resolves to itself, so the caller always has
//! something to show.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const EN: &str = include_str!("locales/en.json");
const NL: &str = include_str!("locales/nl.json");

/// Supported display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Nl,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Nl];

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Nl => "nl",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "nl" => Ok(Self::Nl),
            other => Err(format!("unknown locale: {other}")),
        }
    }
}

/// Resolves translation keys for the active locale.
pub struct TranslationResolver {
    dictionaries: HashMap<Locale, Value>,
    active: RwLock<Locale>,
}

impl TranslationResolver {
    /// Resolver over the dictionaries shipped with the crate.
    pub fn bundled(locale: Locale) -> Self {
        let dictionaries = [(Locale::En, EN), (Locale::Nl, NL)]
            .into_iter()
            .map(|(locale, raw)| {
                let dict = serde_json::from_str(raw).unwrap_or_else(|e| {
                    tracing::warn!(%locale, error = %e, "Bundled dictionary failed to parse");
                    Value::Object(Default::default())
                });
                (locale, dict)
            })
            .collect();
        Self::new(dictionaries, locale)
    }

    /// Resolver over caller-supplied dictionaries.
    pub fn new(dictionaries: HashMap<Locale, Value>, locale: Locale) -> Self {
        Self {
            dictionaries,
            active: RwLock::new(locale),
        }
    }

    pub fn locale(&self) -> Locale {
        *self.active.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_locale(&self, locale: Locale) {
        *self.active.write().unwrap_or_else(|e| e.into_inner()) = locale;
        tracing::debug!(%locale, "Active locale changed");
    }

    /// Resolve `key` in the active locale, echoing the key when it cannot be resolved.
    pub fn t(&self, key: &str) -> String {
        match self.dictionaries.get(&self.locale()) {
            Some(dict) => lookup(dict, key).unwrap_or(key).to_string(),
            None => key.to_string(),
        }
    }

    /// Resolve `key` and substitute each `{name}` placeholder.
    pub fn t_with(&self, key: &str, vars: &[(&str, &str)]) -> String {
        vars.iter().fold(self.t(key), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
    }
}

fn lookup<'a>(dict: &'a Value, key: &str) -> Option<&'a str> {
    key.split('.')
        .try_fold(dict, |node, segment| node.as_object()?.get(segment))?
        .as_str()
}
