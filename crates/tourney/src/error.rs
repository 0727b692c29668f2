//! Unified error type for the Tourney client.

use tourney_protocol::ProtocolError;
use tourney_session::{SessionError, StorageError};
use tourney_store::StoreError;
use tourney_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `tourney` crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TourneyError {
    /// No response from the server, or a bad base URL.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A body couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Login failed, no token, or the server rejected the token.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A resource operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The token file couldn't be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
