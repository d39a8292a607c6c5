//! Conversation and wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::profile::EligibilityProfile;

/// A raw benefit-program record as the remote service returns it.
pub type Scheme = Map<String, Value>;

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: format!("{role}-{}", Uuid::new_v4()),
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Whether the conversation is still gathering facts or showing programs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Intake,
    Results,
}

impl Mode {
    /// Only the literal `"results"` selects results mode.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            Some("results") => Self::Results,
            _ => Self::Intake,
        }
    }
}

/// Ephemeral conversation state.
#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    /// Assigned by the first server reply.
    pub session_id: Option<String>,
    /// Append-only within a session.
    pub messages: Vec<ChatMessage>,
    pub mode: Mode,
    /// Replaced wholesale on each server reply.
    pub candidate_programs: Vec<Scheme>,
}

/// A normalized reply from the remote service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionReply {
    pub reply: Option<String>,
    pub session_id: Option<String>,
    /// Full replacement for the local profile when present.
    pub profile: Option<EligibilityProfile>,
    pub schemes: Option<Vec<Scheme>>,
    pub mode: Mode,
}

impl SessionReply {
    /// Pull the known fields out of a reply body, ignoring any of the wrong type.
    ///
    /// A numeric `session_id` is kept as its decimal text. Returns `None` when
    /// the body is not a JSON object; such a reply carries nothing to fold in.
    pub fn from_body(body: Value) -> Option<Self> {
        let Value::Object(mut body) = body else {
            return None;
        };

        let reply = match body.remove("reply") {
            Some(Value::String(text)) => Some(text),
            _ => None,
        };
        let session_id = match body.remove("session_id") {
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        let profile = match body.get("profile") {
            Some(Value::Object(fields)) => Some(EligibilityProfile::from_json_object(fields)),
            _ => None,
        };
        let schemes = match body.remove("schemes") {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(record) => Some(record),
                        other => {
                            tracing::debug!(record = %other, "Skipping non-object scheme record");
                            None
                        }
                    })
                    .collect(),
            ),
            _ => None,
        };

        Some(Self {
            reply,
            session_id,
            profile,
            schemes,
            mode: Mode::normalize(body.get("mode").and_then(Value::as_str)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(body: Value) -> SessionReply {
        SessionReply::from_body(body).unwrap()
    }

    #[test]
    fn full_reply_decodes() {
        let reply = decode(json!({
            "reply": "Welke gemeente?",
            "session_id": "abc",
            "profile": { "netIncome": 1500, "municipality": null },
            "schemes": [{ "id": 1, "name": "Zorgtoeslag" }, "junk"],
            "mode": "results",
            "extra": true
        }));
        assert_eq!(reply.reply.as_deref(), Some("Welke gemeente?"));
        assert_eq!(reply.session_id.as_deref(), Some("abc"));
        let profile = reply.profile.unwrap();
        assert!(profile.contains("netIncome"));
        assert!(!profile.contains("municipality"));
        assert_eq!(reply.schemes.unwrap().len(), 1);
        assert_eq!(reply.mode, Mode::Results);
    }

    #[test]
    fn empty_reply_decodes_to_defaults() {
        let reply = decode(json!({}));
        assert_eq!(reply, SessionReply::default());
    }

    #[test]
    fn mistyped_fields_are_ignored() {
        let reply = decode(json!({
            "reply": 12,
            "session_id": 42,
            "profile": "none",
            "schemes": { "id": 1 },
            "mode": ["results"]
        }));
        assert_eq!(reply.reply, None);
        assert_eq!(reply.session_id.as_deref(), Some("42"));
        assert_eq!(reply.profile, None);
        assert_eq!(reply.schemes, None);
        assert_eq!(reply.mode, Mode::Intake);
    }

    #[test]
    fn non_object_body_carries_nothing() {
        assert_eq!(SessionReply::from_body(Value::Null), None);
        assert_eq!(SessionReply::from_body(json!(["reply"])), None);
        assert_eq!(SessionReply::from_body(json!("hallo")), None);
    }

    #[test]
    fn unknown_mode_is_intake() {
        assert_eq!(decode(json!({ "mode": "RESULTS" })).mode, Mode::Intake);
        assert_eq!(Mode::normalize(Some("done")), Mode::Intake);
        assert_eq!(Mode::normalize(None), Mode::Intake);
    }

    #[test]
    fn message_ids_carry_role() {
        let m = ChatMessage::user("hoi");
        assert!(m.id.starts_with("user-"));
        assert_ne!(m.id, ChatMessage::user("hoi").id);
        assert!(ChatMessage::assistant("x").id.starts_with("assistant-"));
    }
}
