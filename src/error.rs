//! Error types for the webhook.

use thiserror::Error;

/// Error type for webhook startup and serving
#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),

    /// I/O error (binding the health listener)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to enumerate existing classes.
///
/// The admission policy turns this into a denial whose message is the
/// `Display` text of the error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    /// The informer cache has not finished its initial list yet
    #[error("{kind} lister has not synced yet")]
    NotSynced { kind: &'static str },

    /// The backing store could not be read
    #[error("{0}")]
    Unavailable(String),
}

/// Result type alias for webhook operations
pub type Result<T> = std::result::Result<T, Error>;
