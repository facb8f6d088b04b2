use thiserror::Error;

/// Common result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered 401, or no credential was present to send. The
    /// credential store has already been cleared and the session guard
    /// notified by the time this is returned.
    #[error("session expired")]
    AuthExpired,
    #[error("{0}")]
    Validation(String),
    /// Non-success response with a server-supplied (or status-derived) message.
    #[error("{message}")]
    Application { status: u16, message: String },
    /// The server nominally succeeded but violated the response contract.
    #[error("unexpected response: {0}")]
    Format(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("an action is already pending for {0}")]
    ActionPending(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
