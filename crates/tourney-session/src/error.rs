//! Error types for the session layer.

use std::path::PathBuf;

use tourney_protocol::ProtocolError;
use tourney_transport::TransportError;

/// Errors that can occur during session operations.
///
/// Note what is NOT here: an expired or undecodable persisted token is
/// never an error. [`SessionManager::init`](crate::SessionManager::init)
/// silently downgrades to the logged-out state instead.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The token endpoint rejected the credentials.
    ///
    /// The message is the server's `detail` when it sent one, otherwise a
    /// generic "Login failed".
    #[error("{0}")]
    LoginFailed(String),

    /// An authenticated request was attempted without a token.
    /// Raised before any network call.
    #[error("Authentication required")]
    NotAuthenticated,

    /// The server answered an authenticated request with a non-2xx status.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server `detail` or a generic fallback.
        message: String,
    },

    /// The server issued a token we can't decode.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// No response from the server.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body wasn't the JSON we expected.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The token could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from a [`TokenStorage`](crate::TokenStorage) backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("token storage i/o failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but isn't a JSON object of strings.
    #[error("token storage at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
