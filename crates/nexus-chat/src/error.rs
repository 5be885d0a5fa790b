//! Error types for nexus-chat

use thiserror::Error;

/// Result type alias using nexus-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while synchronizing chat state
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the API layer
    #[error(transparent)]
    Api(#[from] nexus_api::Error),

    /// A list/detail/create call reported failure
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Another send is still in flight
    #[error("A message is already being sent")]
    SendInProgress,
}

impl Error {
    /// Whether this is a fetch failure reported by the backend
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }
}
