//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! Every variant belongs to exactly one [`ErrorKind`], which is what the
//! screens look at when deciding how a failure is surfaced.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Capability denied: {0}")]
    CapabilityDenied(String),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backend answered but carried no content.
    EmptyResponse,
    /// Content was present but was not valid JSON or broke its schema.
    ParseError,
    /// The backend was unreachable or answered with an error status.
    TransportFailure,
    /// A device capability (camera, speech) was refused.
    CapabilityDenied,
    /// Local failures: storage, codecs, configuration.
    Local,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyResponse(_) => ErrorKind::EmptyResponse,
            Error::Parse(_) | Error::Serialization(_) => ErrorKind::ParseError,
            Error::Http(_) | Error::AiProvider(_) => ErrorKind::TransportFailure,
            Error::CapabilityDenied(_) => ErrorKind::CapabilityDenied,
            Error::Io(_)
            | Error::Image(_)
            | Error::EnvVar(_)
            | Error::Config(_)
            | Error::Invariant(_) => ErrorKind::Local,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
