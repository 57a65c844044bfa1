use thiserror::Error;

use crate::Locator;

/// The error taxonomy for the resource loader.
///
/// `LoaderError` never crosses the `update_and_process_all` boundary: it is
/// recorded on the pending request that produced it and surfaced only
/// through [`crate::ResourceStatus::Error`] and the typed
/// `loaded_resource`-style accessors.
#[derive(Error, Debug, Clone)]
pub enum LoaderError {
    #[error("request was cancelled")]
    Cancelled,

    #[error("no provider claims {0}")]
    NotFound(Locator),

    #[error("failed to parse resource: {reason}")]
    ParseError { reason: String },

    #[error("dependency request failed")]
    DependencyFailed,

    #[error("resources exhausted: {reason}")]
    ResourceExhausted { reason: String },

    #[error("blob I/O error: {0}")]
    Store(String),
}

impl From<resource_store::Error> for LoaderError {
    fn from(err: resource_store::Error) -> Self {
        Self::Store(err.to_string())
    }
}

pub type Result<T, E = LoaderError> = std::result::Result<T, E>;
