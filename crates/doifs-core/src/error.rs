//! Error taxonomy for DOI resolution, endpoint discovery and listing.
//!
//! Every failure carries the URL or stage it came from. The host-facing
//! [`VfsBackend`](crate::vfs::VfsBackend) speaks `io::Error`, so `DoiError`
//! converts into one with a mapped [`io::ErrorKind`] while staying reachable
//! through `io::Error::get_ref()`.

use std::io;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DoiError>;

#[derive(Debug, Error)]
pub enum DoiError {
    /// The DOI could not be matched to the pattern a provider requires.
    #[error("malformed DOI '{doi}': {reason}")]
    MalformedDoi { doi: String, reason: String },

    /// The handle API answered with a non-success code or an unusable payload.
    #[error("could not resolve DOI '{doi}': {reason}")]
    Resolution { doi: String, reason: String },

    /// The resolved host is neither a known provider nor a discoverable Invenio installation.
    #[error("provider '{host}' is not supported: {reason}")]
    UnsupportedProvider { host: String, reason: String },

    /// Every discovery strategy for a provider was exhausted.
    #[error("could not discover the API endpoint for '{url}': {reason}")]
    EndpointDiscovery { url: String, reason: String },

    /// Upstream 404, or a path that is absent from the listing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Network failure or non-2xx status, wrapped with the failing operation.
    #[error("{operation} failed for '{url}': {message}")]
    Transport {
        operation: &'static str,
        url: String,
        message: String,
    },

    /// A response body did not match the expected JSON shape.
    #[error("could not decode response from '{url}': {message}")]
    Decode { url: String, message: String },

    /// An option value or key was rejected.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A backend command name that does not exist.
    #[error("command '{0}' not found")]
    CommandNotFound(String),

    /// Every write-style operation.
    #[error("doi remotes are read only")]
    ReadOnly,
}

impl DoiError {
    pub(crate) fn transport(
        operation: &'static str,
        url: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        DoiError::Transport {
            operation,
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// The `io::ErrorKind` this error maps to at the host boundary.
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            DoiError::NotFound(_) => io::ErrorKind::NotFound,
            DoiError::ReadOnly => io::ErrorKind::ReadOnlyFilesystem,
            DoiError::Config(_) | DoiError::MalformedDoi { .. } => io::ErrorKind::InvalidInput,
            DoiError::CommandNotFound(_) => io::ErrorKind::Unsupported,
            _ => io::ErrorKind::Other,
        }
    }
}

impl From<DoiError> for io::Error {
    fn from(err: DoiError) -> Self {
        io::Error::new(err.io_kind(), err)
    }
}
