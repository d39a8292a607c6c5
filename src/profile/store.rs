//! ProfileStore — owns the eligibility profile and the conversation session.
//!
//! Sending a chat message is split in two phases: `begin_send` appends the
//! user's message and claims the in-flight slot, `complete_send` folds the
//! settled exchange back in. `send_utterance` runs both around the bridge call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::BridgeError;
use crate::session::{ChatMessage, ConversationSession, Mode, Scheme, SessionBridge, SessionReply};
use crate::storage::{self, LocalStorage, keys};

use super::migration::{ProfileSource, load_profile};
use super::model::{EligibilityProfile, FieldValue, ProfileProgress, RequiredField};

/// Shown when the server answered without any reply text.
pub const NO_REPLY_FALLBACK: &str = "I couldn't generate a reply.";

/// Shown when the exchange with the server failed.
pub const CONTACT_FAILURE_MESSAGE: &str =
    "Something went wrong while contacting the server. Please try again.";

/// What happened to a `send_utterance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty text or another send still in flight; nothing changed.
    Skipped,
    /// The server answered; whatever reply payload it carried was folded in.
    Replied,
    /// The exchange failed; the contact-failure message was appended.
    Failed,
}

struct State {
    profile: EligibilityProfile,
    session: ConversationSession,
}

/// Releases the in-flight flag when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A send that passed phase one and is waiting for the exchange to settle.
pub struct PendingSend<'a> {
    text: String,
    session_id: Option<String>,
    _guard: InFlight<'a>,
}

impl PendingSend<'_> {
    /// The trimmed text that was appended and should be sent.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Session id as it was when the user message was appended.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

/// Single source of truth for the profile and the conversation session.
pub struct ProfileStore {
    storage: Arc<dyn LocalStorage>,
    bridge: Arc<dyn SessionBridge>,
    state: RwLock<State>,
    in_flight: AtomicBool,
}

impl ProfileStore {
    /// Load the profile from storage (applying the migration policy) and start an empty session.
    pub fn load(storage: Arc<dyn LocalStorage>, bridge: Arc<dyn SessionBridge>) -> Self {
        let (profile, source) = load_profile(storage.as_ref());
        match source {
            ProfileSource::Stored => info!(
                completed = profile.completed_fields().len(),
                "Loaded stored profile"
            ),
            ProfileSource::Demo | ProfileSource::LegacyDiscarded => {
                info!(?source, "Starting from demo profile")
            }
        }

        Self {
            storage,
            bridge,
            state: RwLock::new(State {
                profile,
                session: ConversationSession::default(),
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    // ── Profile ─────────────────────────────────────────────────────

    pub async fn profile(&self) -> EligibilityProfile {
        self.state.read().await.profile.clone()
    }

    /// Set a field unconditionally and rewrite the stored profile.
    pub async fn update_field(&self, field: &str, value: impl Into<FieldValue>) {
        let mut state = self.state.write().await;
        state.profile.set(field, value);
        debug!(field, "Profile field updated");
        self.persist_profile(&state.profile);
    }

    /// Empty the profile and delete its stored entry.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        Self::clear_profile(&mut state, self.storage.as_ref());
    }

    pub async fn completed_fields(&self) -> Vec<RequiredField> {
        self.state.read().await.profile.completed_fields()
    }

    pub async fn missing_fields(&self) -> Vec<RequiredField> {
        self.state.read().await.profile.missing_fields()
    }

    pub async fn is_complete(&self) -> bool {
        self.state.read().await.profile.is_complete()
    }

    pub async fn progress(&self) -> ProfileProgress {
        self.state.read().await.profile.progress()
    }

    // ── Session ─────────────────────────────────────────────────────

    pub async fn session(&self) -> ConversationSession {
        self.state.read().await.session.clone()
    }

    pub async fn session_id(&self) -> Option<String> {
        self.state.read().await.session.session_id.clone()
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.read().await.session.messages.clone()
    }

    pub async fn mode(&self) -> Mode {
        self.state.read().await.session.mode
    }

    pub async fn candidate_programs(&self) -> Vec<Scheme> {
        self.state.read().await.session.candidate_programs.clone()
    }

    /// Whether an exchange is currently in flight.
    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Send a user utterance and fold the server's answer in.
    ///
    /// At most one exchange runs at a time; a call made while one is pending
    /// is skipped, not queued.
    pub async fn send_utterance(&self, text: &str) -> SendOutcome {
        let Some(pending) = self.begin_send(text).await else {
            return SendOutcome::Skipped;
        };
        let result = self.bridge.send(pending.session_id(), pending.text()).await;
        self.complete_send(pending, result).await
    }

    /// Phase one: claim the in-flight slot and append the user's message.
    ///
    /// Returns `None` for blank text or when another send is still pending.
    pub async fn begin_send(&self, text: &str) -> Option<PendingSend<'_>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Send skipped: another exchange is in flight");
            return None;
        }
        let guard = InFlight(&self.in_flight);

        let mut state = self.state.write().await;
        state.session.messages.push(ChatMessage::user(text));
        Some(PendingSend {
            text: text.to_string(),
            session_id: state.session.session_id.clone(),
            _guard: guard,
        })
    }

    /// Phase two: fold the settled exchange in and append the assistant's message.
    ///
    /// The in-flight slot is released when this returns.
    pub async fn complete_send(
        &self,
        pending: PendingSend<'_>,
        result: Result<Option<SessionReply>, BridgeError>,
    ) -> SendOutcome {
        let mut state = self.state.write().await;
        let outcome = match result {
            Ok(Some(reply)) => {
                let content = reply
                    .reply
                    .clone()
                    .unwrap_or_else(|| NO_REPLY_FALLBACK.to_string());
                self.fold_reply(&mut state, reply);
                state.session.messages.push(ChatMessage::assistant(content));
                SendOutcome::Replied
            }
            // Session fields stay as they were.
            Ok(None) => {
                state
                    .session
                    .messages
                    .push(ChatMessage::assistant(NO_REPLY_FALLBACK));
                SendOutcome::Replied
            }
            Err(e) => {
                warn!(error = %e, "Chat exchange failed");
                state
                    .session
                    .messages
                    .push(ChatMessage::assistant(CONTACT_FAILURE_MESSAGE));
                SendOutcome::Failed
            }
        };
        drop(state);
        drop(pending);
        outcome
    }

    /// Re-read the server's view of the current session and fold it in.
    ///
    /// Returns whether anything was folded: nothing happens before a session
    /// id exists or when the server sends no payload. Messages are untouched.
    pub async fn refresh_session(&self) -> Result<bool, BridgeError> {
        let Some(session_id) = self.session_id().await else {
            return Ok(false);
        };
        let Some(reply) = self.bridge.fetch_session(&session_id).await? else {
            return Ok(false);
        };
        let mut state = self.state.write().await;
        self.fold_reply(&mut state, reply);
        Ok(true)
    }

    /// Wipe the profile (including its stored entry) and the whole conversation.
    pub async fn reset_session(&self) {
        let mut state = self.state.write().await;
        Self::clear_profile(&mut state, self.storage.as_ref());
        state.session = ConversationSession::default();
        info!("Session reset");
    }

    /// Server-sent fields replace local ones wholesale; nothing is merged.
    fn fold_reply(&self, state: &mut State, reply: SessionReply) {
        if let Some(profile) = reply.profile {
            state.profile = profile;
            self.persist_profile(&state.profile);
        }
        state.session.candidate_programs = reply.schemes.unwrap_or_default();
        state.session.session_id = reply.session_id;
        state.session.mode = reply.mode;
        debug!(
            session_id = ?state.session.session_id,
            mode = ?state.session.mode,
            programs = state.session.candidate_programs.len(),
            "Server reply folded into session"
        );
    }

    fn clear_profile(state: &mut State, storage: &dyn LocalStorage) {
        state.profile = EligibilityProfile::new();
        if let Err(e) = storage.remove(keys::PROFILE) {
            warn!(error = %e, "Failed to delete stored profile");
        }
    }

    fn persist_profile(&self, profile: &EligibilityProfile) {
        if let Err(e) = storage::write_json(self.storage.as_ref(), keys::PROFILE, profile) {
            warn!(error = %e, "Failed to persist profile");
        }
    }
}
