//! Error types for the AWS bindings.

use thiserror::Error;

/// Errors raised while preparing AWS clients.
#[derive(Debug, Error)]
pub enum AwsError {
    /// `~` was used in a path but no home directory could be determined.
    #[error("cannot expand {path}: home directory unknown")]
    NoHomeDirectory { path: String },

    /// The instance identity document could not be fetched.
    #[error("failed to retrieve instance metadata: {0}")]
    Metadata(String),

    /// The instance identity document could not be parsed.
    #[error("invalid instance identity document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

impl From<AwsError> for roll_core::IdentityError {
    fn from(err: AwsError) -> Self {
        roll_core::IdentityError::Metadata(err.to_string())
    }
}
