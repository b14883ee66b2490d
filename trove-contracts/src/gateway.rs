use thiserror::Error;

/// Failure reported by any remote collaborator.
///
/// Clonable so a single failed transfer can be fanned out to every waiter
/// that shared it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success status; `message` is the response body text.
    #[error("server responded {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Human-readable body, possibly empty.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Shorthand for [`GatewayError::Status`].
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Status {
            status,
            message: message.into(),
        }
    }

    /// Status code, for status errors only.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Result of a remote collaborator call.
pub type GatewayResult<T> = Result<T, GatewayError>;
