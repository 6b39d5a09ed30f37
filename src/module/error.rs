//! Module client errors

use thiserror::Error;

/// Errors surfaced by module clients
#[derive(Debug, Error)]
pub enum ModuleError {
    /// A command failed while error raising is enabled
    ///
    /// The message reads `<module> class (<verb>): <cause>`.
    #[error("{0}")]
    Command(String),

    /// Opening the connection failed
    #[error("{module} class: connect failed: {reason}")]
    Connect { module: String, reason: String },

    /// Closing the connection failed
    #[error("{module} class: disconnect failed: {reason}")]
    Disconnect { module: String, reason: String },
}

impl ModuleError {
    /// Message of a failed command, if this is one
    pub fn command_message(&self) -> Option<&str> {
        match self {
            ModuleError::Command(message) => Some(message),
            _ => None,
        }
    }
}

/// Result type of module operations
pub type ModuleResult<T> = Result<T, ModuleError>;
