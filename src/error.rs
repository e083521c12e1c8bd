//! Error types shared across the bot.
//!
//! None of these are fatal once the bot is running: corpus and completion
//! failures degrade to fallback text, emit failures are logged and dropped.
//! Only [`ConfigError`] stops the process, and only at startup.

/// Invalid or missing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Failure while pulling roast lines from a remote page.
#[derive(Debug, thiserror::Error)]
pub enum CorpusFetchError {
    #[error("corpus request failed: {0}")]
    Http(String),

    #[error("corpus source returned status {0}")]
    Status(u16),

    #[error("corpus page could not be parsed: {0}")]
    Parse(String),
}

/// Failure of a single completion call.
///
/// Produced by the gateway adapter from the HTTP status and transport
/// errors, so callers can choose a fallback without inspecting messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("completion service rejected credentials: {0}")]
    Auth(String),

    #[error("completion service rate limited the request: {0}")]
    RateLimit(String),

    #[error("completion model error: {0}")]
    Model(String),

    #[error("completion transport error: {0}")]
    Transport(String),

    #[error("unexpected completion failure: {0}")]
    Unknown(String),
}

impl CompletionError {
    /// Stable label for logs and outcome reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::RateLimit(_) => "rate_limit",
            Self::Model(_) => "model",
            Self::Transport(_) => "transport",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Failure to deliver a message to the chat gateway.
#[derive(Debug, thiserror::Error)]
#[error("failed to send to conversation {conversation}: {reason}")]
pub struct EmitError {
    pub conversation: u64,
    pub reason: String,
}
