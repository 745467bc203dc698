//! Shared error type across tsdadmin crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed or unsupported request.
    BadRequest,
    /// Anything else.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and error pages.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status code for this class of failure.
    pub fn status(self) -> u16 {
        match self {
            ClientCode::BadRequest => 400,
            ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, AdminError>;

/// Unified error type used by core and server.
///
/// Only [`AdminError::BadRequest`] is the recoverable client-error kind.
/// Every other variant is an unclassified failure.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("command panicked: {0}")]
    Panicked(String),
}

impl AdminError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AdminError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AdminError::Internal(msg.into())
    }

    /// Build an error from a caught panic payload.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        AdminError::Panicked(msg)
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, AdminError::BadRequest(_))
    }

    /// Message shown to the client for a client error: the bare reason,
    /// without the `bad request:` prefix.
    pub fn client_message(&self) -> String {
        match self {
            AdminError::BadRequest(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        if self.is_client_error() {
            ClientCode::BadRequest
        } else {
            ClientCode::Internal
        }
    }
}
