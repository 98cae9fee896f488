use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(Uuid),

    #[error("Recipient not found: {0}")]
    RecipientNotFound(String),

    /// Deliberately carries nothing about the resource that was refused.
    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid message body: {0}")]
    InvalidBody(&'static str),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Coarse failure class for the request layer to map onto its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidBody,
    RecipientNotFound,
    Storage,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound(_) | Self::MessageNotFound(_) => ErrorKind::NotFound,
            Self::Forbidden => ErrorKind::Forbidden,
            Self::InvalidBody(_) => ErrorKind::InvalidBody,
            Self::RecipientNotFound(_) => ErrorKind::RecipientNotFound,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<tokio::task::JoinError> for CoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Storage(anyhow::anyhow!("spawn_blocking join error: {}", err))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
