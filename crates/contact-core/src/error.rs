//! Error Types

use thiserror::Error;

/// Result type alias for contact operations
pub type Result<T> = std::result::Result<T, ContactError>;

/// Contact pipeline errors
#[derive(Error, Debug)]
pub enum ContactError {
    /// Submitted payload does not match the form schema
    #[error("{0}")]
    Validation(String),

    /// Backing store failed to read or append
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Mail transport failed to deliver
    #[error("Notification error: {0}")]
    Notification(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ContactError {
    /// Whether the caller caused this error
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Persistence(_) => {
                "We could not save your submission. Please try again later.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}
