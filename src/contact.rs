//! Contact details the user leaves when starting an application.
//!
//! Four separate storage entries hold the name, the email address and the
//! program the details were given for. Only the email is required for the
//! details to count as present.

use std::sync::Arc;

use crate::error::ContactError;
use crate::i18n::TranslationResolver;
use crate::storage::{self, LocalStorage};

/// Storage keys for the contact entries.
pub mod keys {
    pub const EMAIL: &str = "hulpwijzer_user_email";
    pub const NAME: &str = "hulpwijzer_user_name";
    pub const PROGRAM_ID: &str = "hulpwijzer_program_id";
    pub const PROGRAM_TITLE_KEY: &str = "hulpwijzer_program_title_key";
}

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 255;

/// Stored contact details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    /// `None` when no name, or an empty one, was stored.
    pub name: Option<String>,
    pub email: String,
    /// Empty when the details were changed outside an application.
    pub program_id: String,
    pub program_title_key: String,
}

impl ContactDetails {
    /// The one-line reminder of which address updates go to.
    pub fn banner(&self, t: &TranslationResolver) -> String {
        match &self.name {
            Some(name) => t.t_with(
                "emailCapture.banner",
                &[("name", name.as_str()), ("email", self.email.as_str())],
            ),
            None => t.t_with("emailCapture.bannerNoName", &[("email", self.email.as_str())]),
        }
    }
}

/// Trim and check a name.
pub fn validate_name(name: &str) -> Result<String, ContactError> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(ContactError::InvalidName { max: MAX_NAME_LEN });
    }
    Ok(name.to_string())
}

/// Trim and check an email address.
pub fn validate_email(email: &str) -> Result<String, ContactError> {
    let email = email.trim();
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(ContactError::InvalidEmail {
            reason: format!("longer than {MAX_EMAIL_LEN} characters"),
        });
    }
    let address = email
        .parse::<lettre::Address>()
        .map_err(|e| ContactError::InvalidEmail {
            reason: e.to_string(),
        })?;
    Ok(address.to_string())
}

/// Contact details over local storage.
pub struct ContactStore {
    storage: Arc<dyn LocalStorage>,
}

impl ContactStore {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    /// Validate and store the details, name first.
    ///
    /// Nothing is written unless both the name and the email are valid.
    pub fn save(
        &self,
        name: &str,
        email: &str,
        program_id: &str,
        program_title_key: &str,
    ) -> Result<ContactDetails, ContactError> {
        let name = validate_name(name)?;
        let email = validate_email(email)?;

        let store = self.storage.as_ref();
        storage::write_json(store, keys::EMAIL, &email)?;
        storage::write_json(store, keys::NAME, &name)?;
        storage::write_json(store, keys::PROGRAM_ID, program_id)?;
        storage::write_json(store, keys::PROGRAM_TITLE_KEY, program_title_key)?;
        tracing::info!(program_id, "Contact details saved");

        Ok(ContactDetails {
            name: Some(name),
            email,
            program_id: program_id.to_string(),
            program_title_key: program_title_key.to_string(),
        })
    }

    /// The stored details, or `None` when no email is stored.
    pub fn load(&self) -> Option<ContactDetails> {
        let email = self.read(keys::EMAIL)?;
        Some(ContactDetails {
            name: self.read(keys::NAME),
            email,
            program_id: self.read(keys::PROGRAM_ID).unwrap_or_default(),
            program_title_key: self.read(keys::PROGRAM_TITLE_KEY).unwrap_or_default(),
        })
    }

    /// Banner text for the stored details, if there are any.
    pub fn banner(&self, t: &TranslationResolver) -> Option<String> {
        self.load().map(|details| details.banner(t))
    }

    /// Read a non-empty string entry. Unreadable entries count as absent.
    fn read(&self, key: &str) -> Option<String> {
        let raw = match self.storage.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "Could not read contact entry");
                return None;
            }
        };
        match serde_json::from_str::<String>(&raw) {
            Ok(value) if !value.is_empty() => Some(value),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(key, error = %e, "Ignoring malformed contact entry");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use crate::storage::MemoryStorage;

    fn store() -> (ContactStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (ContactStore::new(storage.clone()), storage)
    }

    #[test]
    fn save_trims_and_persists_all_entries() {
        let (contacts, storage) = store();
        let saved = contacts
            .save("  Sanne ", " sanne@example.nl ", "3", "programs.healthcare.title")
            .unwrap();

        assert_eq!(saved.name.as_deref(), Some("Sanne"));
        assert_eq!(saved.email, "sanne@example.nl");
        assert_eq!(storage.get(keys::EMAIL).unwrap().as_deref(), Some(r#""sanne@example.nl""#));
        assert_eq!(storage.get(keys::NAME).unwrap().as_deref(), Some(r#""Sanne""#));
        assert_eq!(storage.get(keys::PROGRAM_ID).unwrap().as_deref(), Some(r#""3""#));
        assert_eq!(contacts.load(), Some(saved));
    }

    #[test]
    fn invalid_name_writes_nothing() {
        let (contacts, storage) = store();
        let err = contacts.save("   ", "a@example.nl", "1", "").unwrap_err();
        assert!(matches!(err, ContactError::InvalidName { .. }));
        assert_eq!(err.message_key(), "emailCapture.invalidName");
        assert!(storage.get(keys::EMAIL).unwrap().is_none());

        let too_long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_name(&too_long).is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn invalid_email_writes_nothing() {
        let (contacts, storage) = store();
        for email in ["", "not-an-address", "two@@example.nl", "spaces in@example.nl"] {
            let err = contacts.save("Sanne", email, "1", "").unwrap_err();
            assert!(matches!(err, ContactError::InvalidEmail { .. }), "input {email:?}");
            assert_eq!(err.message_key(), "emailCapture.invalidEmail");
        }
        assert!(storage.get(keys::NAME).unwrap().is_none());
    }

    #[test]
    fn overlong_email_is_rejected() {
        let email = format!("{}@example.nl", "a".repeat(MAX_EMAIL_LEN));
        assert!(matches!(
            validate_email(&email),
            Err(ContactError::InvalidEmail { .. })
        ));
    }

    #[test]
    fn nothing_stored_means_no_banner() {
        let (contacts, storage) = store();
        let t = TranslationResolver::bundled(Locale::En);
        assert_eq!(contacts.load(), None);
        assert_eq!(contacts.banner(&t), None);

        storage.set(keys::NAME, r#""Sanne""#).unwrap();
        assert_eq!(contacts.banner(&t), None, "a name without an email shows nothing");
    }

    #[test]
    fn banner_with_and_without_name() {
        let (contacts, storage) = store();
        let t = TranslationResolver::bundled(Locale::En);
        contacts.save("Sanne", "sanne@example.nl", "", "").unwrap();
        let banner = contacts.banner(&t).unwrap();
        assert!(banner.contains("Sanne"));
        assert!(banner.contains("sanne@example.nl"));
        assert!(!banner.contains('{'));

        storage.set(keys::NAME, r#""""#).unwrap();
        let banner = contacts.banner(&t).unwrap();
        assert!(!banner.contains("Sanne"));
        assert!(banner.contains("sanne@example.nl"));
        assert!(!banner.contains('{'));
    }

    #[test]
    fn malformed_entries_count_as_absent() {
        let (contacts, storage) = store();
        storage.set(keys::EMAIL, "sanne@example.nl").unwrap();
        assert_eq!(contacts.load(), None);
    }
}
