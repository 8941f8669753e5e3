//! CLI error type.

use qkart_client::{ApiError, ConfigError, Severity, StorefrontError};
use thiserror::Error;

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The environment holds an invalid setting.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("Could not start the HTTP client: {0}")]
    Client(#[from] ApiError),

    /// A storefront operation failed.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// Reading from stdin failed.
    #[error("Could not read input: {0}")]
    Input(#[from] std::io::Error),
}

impl CliError {
    /// The message to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storefront(e) => e.user_message(),
            _ => self.to_string(),
        }
    }

    /// How the message should be presented.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Storefront(e) => e.severity(),
            _ => Severity::Error,
        }
    }
}
