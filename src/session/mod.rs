//! Conversational session with the remote eligibility service.

pub mod bridge;
pub mod model;

pub use bridge::{ChatEncoding, HttpSessionBridge, SessionBridge};
pub use model::{ChatMessage, ConversationSession, Mode, Role, Scheme, SessionReply};
