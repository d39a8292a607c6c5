//! Application context: everything the presentation layer talks to.
//!
//! Built once at startup and passed by reference. `install` additionally
//! makes it reachable process-wide; `get` fails fast until that happens.

use std::sync::{Arc, OnceLock};

use crate::applications::{ApplicationTracker, ProgramCatalog};
use crate::config::AppConfig;
use crate::contact::ContactStore;
use crate::error::{ContextError, Result};
use crate::i18n::TranslationResolver;
use crate::profile::ProfileStore;
use crate::session::{HttpSessionBridge, SessionBridge};
use crate::storage::{FileStorage, LocalStorage};

static CONTEXT: OnceLock<AppContext> = OnceLock::new();

pub struct AppContext {
    pub config: AppConfig,
    pub translations: TranslationResolver,
    pub catalog: ProgramCatalog,
    pub profile: ProfileStore,
    pub applications: ApplicationTracker,
    pub contact: ContactStore,
}

impl AppContext {
    /// Wire the context from explicit collaborators.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn LocalStorage>,
        bridge: Arc<dyn SessionBridge>,
    ) -> Self {
        Self {
            translations: TranslationResolver::bundled(config.locale),
            catalog: ProgramCatalog::bundled(),
            profile: ProfileStore::load(Arc::clone(&storage), bridge),
            applications: ApplicationTracker::load(Arc::clone(&storage)),
            contact: ContactStore::new(storage),
            config,
        }
    }

    /// File-backed storage in `config.data_dir` and an HTTP bridge to `config.api_url`.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(&config.data_dir));
        let bridge: Arc<dyn SessionBridge> = Arc::new(HttpSessionBridge::new(&config)?);
        Ok(Self::new(config, storage, bridge))
    }

    /// Make this context the process-wide one. Only the first call succeeds.
    pub fn install(self) -> std::result::Result<&'static AppContext, ContextError> {
        CONTEXT
            .set(self)
            .map_err(|_| ContextError::AlreadyInitialized)?;
        tracing::debug!("Application context installed");
        Self::get()
    }

    /// The installed context.
    pub fn get() -> std::result::Result<&'static AppContext, ContextError> {
        CONTEXT.get().ok_or(ContextError::NotInitialized)
    }

    /// Start an application for a catalog program.
    ///
    /// Returns `false` for programs the catalog does not know or that were already started.
    pub fn start_application(&self, program_id: &str) -> bool {
        match self.catalog.get(program_id) {
            Some(program) => self.applications.add_application(program.new_application()),
            None => {
                tracing::debug!(program_id, "No catalog entry for program");
                false
            }
        }
    }
}
