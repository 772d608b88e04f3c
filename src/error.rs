use thiserror::Error;

/// Errors surfaced by the client. None of these are fatal to the process:
/// the worst case is a stale board, recoverable with a full resync.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("websocket connect failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("unrecognized server event: {0}")]
    UnrecognizedEvent(#[from] serde_json::Error),

    #[error("invalid position string: {0}")]
    InvalidFen(String),
}
