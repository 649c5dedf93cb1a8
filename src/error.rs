//! All error types for the textsync crate.
//!
//! These are returned from configuration validation, content API calls,
//! transformation, and file writes.

use std::path::PathBuf;

use thiserror::Error;

/// Message used when the API rejects a filter without explaining why.
pub const INVALID_FILTERS_MESSAGE: &str = "invalid filters; check the projects, variants, folders and statuses in your configuration";

/// Message used when the API cannot be reached.
pub const TRANSPORT_MESSAGE: &str =
    "could not reach the content API; check your network connection and try again later";

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("filter rejected: {0}")]
    FilterRejected(String),

    #[error("authentication failed: the API token is missing, invalid, or expired")]
    Auth,

    #[error(
        "access denied: {0}; enable API access for this workspace or choose other projects"
    )]
    Access(String),

    #[error("{0}")]
    Transport(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Creates a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Creates a filter rejection, falling back to a generic message when the
    /// server did not send one.
    pub fn filter_rejected(server_message: Option<String>) -> Self {
        match server_message {
            Some(message) if !message.trim().is_empty() => Error::FilterRejected(message),
            _ => Error::FilterRejected(INVALID_FILTERS_MESSAGE.to_string()),
        }
    }

    /// Creates a transport error carrying the server message when present.
    pub fn transport(server_message: Option<String>) -> Self {
        match server_message {
            Some(message) if !message.trim().is_empty() => Error::Transport(message),
            _ => Error::Transport(TRANSPORT_MESSAGE.to_string()),
        }
    }

    /// Whether a fresh token should be collected before retrying.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth)
    }
}

/// Outputs that share one failed request each report their own copy.
///
/// Wrapped `serde_json` and I/O errors keep their message and kind.
impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Error::Configuration(message) => Error::Configuration(message.clone()),
            Error::FilterRejected(message) => Error::FilterRejected(message.clone()),
            Error::Auth => Error::Auth,
            Error::Access(message) => Error::Access(message.clone()),
            Error::Transport(message) => Error::Transport(message.clone()),
            Error::Parse(error) => Error::Parse(serde::de::Error::custom(error)),
            Error::Write { path, source } => Error::Write {
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            Error::UnsupportedFormat(format) => Error::UnsupportedFormat(format.clone()),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        tracing::debug!(%error, "content API request failed");
        Error::transport(None)
    }
}
