use thiserror::Error;

/// An error type for the resource-store crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("data mismatch: {reason}")]
    DataMismatch { reason: String },
    #[error("the blob is corrupted: {reason}")]
    Corrupt { reason: String },
    #[error("blob I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("resources exhausted: {reason}")]
    ResourceExhausted { reason: String },
    #[error("unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

/// A result type that can be used to indicate errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;
