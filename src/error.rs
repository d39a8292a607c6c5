//! Error types for Hulpwijzer.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Session bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Durable storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error on entry {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error on entry {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a remote exchange.
///
/// Callers treat every variant the same way; the distinction only exists for logs.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Remote service answered with status {status}")]
    Status { status: u16 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for BridgeError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Rejected or unsaved contact details.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("Name must be between 1 and {max} characters")]
    InvalidName { max: usize },

    #[error("Invalid email address: {reason}")]
    InvalidEmail { reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ContactError {
    /// Translation key of the message shown to the user.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => "emailCapture.invalidName",
            Self::InvalidEmail { .. } => "emailCapture.invalidEmail",
            Self::Storage(_) => "emailCapture.saveFailed",
        }
    }
}

/// Errors around the process-wide application context.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Application context used before it was installed")]
    NotInitialized,

    #[error("Application context was already installed")]
    AlreadyInitialized,
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
