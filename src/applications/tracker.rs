//! ApplicationTracker — registry of applications the user has started.
//!
//! Independent of the profile and the remote service. Operations are
//! synchronous, and every change rewrites the stored list in full.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::storage::{self, LocalStorage, keys};

use super::model::{NewApplication, UserApplication};

pub struct ApplicationTracker {
    storage: Arc<dyn LocalStorage>,
    applications: RwLock<Vec<UserApplication>>,
}

impl ApplicationTracker {
    /// Load the stored list. An unreadable entry starts the tracker empty.
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        let applications: Vec<UserApplication> = match storage.get(keys::APPLICATIONS) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Stored applications are unreadable; starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Could not read stored applications; starting empty");
                Vec::new()
            }
        };
        debug!(count = applications.len(), "Application tracker loaded");

        Self {
            storage,
            applications: RwLock::new(applications),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<UserApplication>> {
        self.applications.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<UserApplication>> {
        self.applications.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Start an application. Does nothing if one already exists for the program.
    ///
    /// Returns whether a new entry was created.
    pub fn add_application(&self, new: NewApplication) -> bool {
        let mut applications = self.write();
        if applications.iter().any(|a| a.program_id == new.program_id) {
            debug!(program_id = %new.program_id, "Application already exists");
            return false;
        }

        info!(program_id = %new.program_id, total_steps = new.total_steps, "Application started");
        applications.push(UserApplication::start(new, Utc::now()));
        self.persist(&applications);
        true
    }

    /// Move an application to `current_step` and recompute its progress.
    ///
    /// Unknown programs are ignored. Steps beyond `total_steps` are accepted.
    pub fn update_progress(&self, program_id: &str, current_step: u32) -> bool {
        let mut applications = self.write();
        let Some(app) = applications.iter_mut().find(|a| a.program_id == program_id) else {
            return false;
        };

        app.set_step(current_step);
        debug!(program_id, current_step, progress = app.progress, "Application progress updated");
        self.persist(&applications);
        true
    }

    pub fn get_application(&self, program_id: &str) -> Option<UserApplication> {
        self.read().iter().find(|a| a.program_id == program_id).cloned()
    }

    pub fn has_application(&self, program_id: &str) -> bool {
        self.read().iter().any(|a| a.program_id == program_id)
    }

    /// All applications in the order they were started.
    pub fn applications(&self) -> Vec<UserApplication> {
        self.read().clone()
    }

    fn persist(&self, applications: &[UserApplication]) {
        if let Err(e) = storage::write_json(self.storage.as_ref(), keys::APPLICATIONS, applications) {
            warn!(error = %e, "Failed to persist applications");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn new_app(id: &str, total_steps: u32) -> NewApplication {
        NewApplication {
            program_id: id.into(),
            title_key: "k".into(),
            total_steps,
        }
    }

    fn tracker() -> (ApplicationTracker, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (ApplicationTracker::load(storage.clone()), storage)
    }

    #[test]
    fn add_creates_fresh_entry() {
        let (tracker, _storage) = tracker();
        let before = Utc::now();
        assert!(tracker.add_application(new_app("1", 4)));

        let app = tracker.get_application("1").unwrap();
        assert_eq!(app.current_step, 0);
        assert_eq!(app.progress, 0);
        assert_eq!(app.total_steps, 4);
        assert!(app.started_at >= before);
        assert!(tracker.has_application("1"));
        assert!(!tracker.has_application("2"));
    }

    #[test]
    fn add_is_idempotent_by_program() {
        let (tracker, _storage) = tracker();
        tracker.add_application(new_app("1", 4));
        tracker.update_progress("1", 2);
        let first = tracker.get_application("1").unwrap();

        assert!(!tracker.add_application(new_app("1", 9)));
        assert_eq!(tracker.applications().len(), 1);
        assert_eq!(tracker.get_application("1").unwrap(), first);
    }

    #[test]
    fn progress_is_not_clamped() {
        let (tracker, _storage) = tracker();
        tracker.add_application(new_app("3", 3));
        tracker.update_progress("3", 3);
        assert_eq!(tracker.get_application("3").unwrap().progress, 100);
        tracker.update_progress("3", 4);
        let app = tracker.get_application("3").unwrap();
        assert_eq!(app.progress, 133);
        assert_eq!(app.current_step, 4);
    }

    #[test]
    fn progress_follows_rounding_for_each_step() {
        let (tracker, _storage) = tracker();
        tracker.add_application(new_app("7", 7));
        for k in 0..=10u32 {
            tracker.update_progress("7", k);
            let expected = (f64::from(k) / 7.0 * 100.0).round() as u32;
            assert_eq!(tracker.get_application("7").unwrap().progress, expected);
        }
    }

    #[test]
    fn unknown_program_is_ignored() {
        let (tracker, storage) = tracker();
        assert!(!tracker.update_progress("nope", 1));
        assert!(tracker.get_application("nope").is_none());
        assert!(storage.get(keys::APPLICATIONS).unwrap().is_none());
    }

    #[test]
    fn changes_survive_reload() {
        let (tracker, storage) = tracker();
        tracker.add_application(new_app("1", 4));
        tracker.add_application(new_app("5", 3));
        tracker.update_progress("5", 1);

        let reloaded = ApplicationTracker::load(storage);
        let ids: Vec<String> = reloaded.applications().into_iter().map(|a| a.program_id).collect();
        assert_eq!(ids, vec!["1", "5"]);
        assert_eq!(reloaded.get_application("5").unwrap().progress, 33);
    }

    #[test]
    fn corrupt_entry_starts_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::APPLICATIONS, "{not json").unwrap();
        let tracker = ApplicationTracker::load(storage);
        assert!(tracker.applications().is_empty());
    }
}
