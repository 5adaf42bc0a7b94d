use thiserror::Error;

use crate::messages::{auth::AuthType, backend::MessageCode};

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for encoding, decoding, and reading Postgres
/// authentication messages.
#[derive(Debug, Error)]
pub enum Error {
    #[error("bad authentication message size: expected {expected} bytes, got {actual}")]
    BadMessageSize { expected: usize, actual: usize },

    #[error("bad auth type: expected {expected}, got {actual}")]
    BadAuthType { expected: AuthType, actual: AuthType },

    #[error("unsupported auth type {0}")]
    UnsupportedAuthType(AuthType),

    #[error("unexpected message code {0}")]
    UnexpectedMessageCode(MessageCode),

    /// The backend answered with an ErrorResponse instead of an
    /// authentication request.
    #[error("server rejected authentication: [{code}] {message}")]
    Server { code: String, message: String },

    /// The framed length does not fit in the u32 length field.
    #[error("message length {0} exceeds the u32 length field")]
    MessageTooLarge(usize),

    /// The marker's length slot no longer lies inside the buffer.
    #[error("marker at {position} is outside a {len} byte buffer")]
    InvalidMarker { position: usize, len: usize },

    #[error("encountered I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON message: {0}")]
    Json(#[from] serde_json::Error),
}
