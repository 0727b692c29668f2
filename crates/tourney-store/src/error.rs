//! Error types for the store layer.

use tourney_protocol::ProtocolError;
use tourney_transport::TransportError;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The operation needs a bearer token and there is none.
    /// Raised before anything is sent.
    #[error("Authentication required")]
    AuthRequired,

    /// The server answered with a non-2xx status.
    ///
    /// `message` is the server's `detail` when it sent one, otherwise the
    /// operation's fallback (e.g. "Failed to create tournament").
    #[error("{message}")]
    Server { status: u16, message: String },

    /// No response was obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A body couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl StoreError {
    /// The HTTP status for [`StoreError::Server`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
