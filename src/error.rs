use thiserror::Error;

/// Errors surfaced by the console core.
///
/// The transport reports a 401 as a `None` payload plus a flag on
/// [`crate::api::SessionState`]; `SessionExpired` is what one-shot commands raise
/// when they get that payload.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Network failure or non-2xx response.
    #[error("{message}")]
    Http { status: Option<u16>, message: String },

    #[error("session expired, please log in again")]
    SessionExpired,

    /// Payload shape did not match what the view expects.
    #[error("malformed {what}: {detail}")]
    MalformedData { what: &'static str, detail: String },

    /// The server answered but reported the mutation as failed.
    #[error("{0}")]
    Operation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ConsoleError {
    pub fn malformed(what: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedData {
            what,
            detail: detail.into(),
        }
    }

    /// HTTP status of a transport error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
