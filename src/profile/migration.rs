//! Cold-start loading of the stored profile.
//!
//! The stored entry is accepted only when it is a JSON object carrying at
//! least one current field and none of the legacy ones. A legacy entry is
//! erased; anything else unusable is left alone and the demo profile is used.

use serde_json::Value;

use crate::storage::{LocalStorage, keys};

use super::model::{EligibilityProfile, RequiredField};

/// Field names from the previous profile schema.
const LEGACY_FIELDS: &[&str] = &["parentalStatus", "employmentStatus"];

/// Where the startup profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    /// The stored entry was current and accepted as-is.
    Stored,
    /// Nothing usable was stored.
    Demo,
    /// A legacy entry was found, erased, and replaced by the demo profile.
    LegacyDiscarded,
}

/// Load the profile at startup, applying the migration policy.
pub fn load_profile(storage: &dyn LocalStorage) -> (EligibilityProfile, ProfileSource) {
    let raw = match storage.get(keys::PROFILE) {
        Ok(Some(raw)) => raw,
        Ok(None) => return (EligibilityProfile::demo(), ProfileSource::Demo),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read stored profile; using demo profile");
            return (EligibilityProfile::demo(), ProfileSource::Demo);
        }
    };

    let object = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(object)) => object,
        Ok(_) | Err(_) => {
            tracing::debug!("Stored profile is not a JSON object; using demo profile");
            return (EligibilityProfile::demo(), ProfileSource::Demo);
        }
    };

    // A key counts as present even when its value is null.
    if LEGACY_FIELDS.iter().any(|&f| object.contains_key(f)) {
        tracing::info!("Legacy profile schema detected; discarding stored profile");
        if let Err(e) = storage.remove(keys::PROFILE) {
            tracing::warn!(error = %e, "Failed to erase legacy profile entry");
        }
        return (EligibilityProfile::demo(), ProfileSource::LegacyDiscarded);
    }

    if !RequiredField::ALL.iter().any(|f| object.contains_key(f.key())) {
        tracing::debug!("Stored profile has no current fields; using demo profile");
        return (EligibilityProfile::demo(), ProfileSource::Demo);
    }

    (EligibilityProfile::from_json_object(&object), ProfileSource::Stored)
}
