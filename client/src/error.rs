use thiserror::Error;

/// Message fragment the backend uses when rejecting a caller.
const UNAUTHORIZED_PATTERN: &str = "is not authorized";

/// Errors surfaced by the storage client.
///
/// Backend failures are classified at the workflow boundary: authorization
/// rejections get their own variant so the presentation layer can render a
/// friendlier notice, everything else is surfaced verbatim. Nothing is
/// retried automatically.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected before any network call was made.
    #[error("{0}")]
    Validation(String),
    /// The backend rejected the operation for the current identity.
    #[error("{0}")]
    Unauthorized(String),
    /// Transport or replica failure.
    #[error(transparent)]
    Agent(#[from] ic_agent::AgentError),
    /// Asset store rejected the operation.
    #[error("{0}")]
    Store(String),
    /// Session state is missing or unusable.
    #[error("{0}")]
    Session(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Classify a backend call failure by its message.
    pub fn from_agent(error: ic_agent::AgentError) -> Self {
        let message = error.to_string();
        if message.contains(UNAUTHORIZED_PATTERN) {
            ClientError::Unauthorized(message)
        } else {
            ClientError::Agent(error)
        }
    }

    /// Classify a backend failure reported as a bare message.
    pub fn backend(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(UNAUTHORIZED_PATTERN) {
            ClientError::Unauthorized(message)
        } else {
            ClientError::Store(message)
        }
    }

    /// Message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthorized(_) => {
                "Caller is not authorized, follow the authorization instructions in the README"
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}
