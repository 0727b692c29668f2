//! Codec trait and the JSON implementation used for API bodies.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The session and store layers don't call `serde_json` directly: they hold
//! a [`Codec`] and go through it, so every body crossing the wire fails the
//! same way ([`ProtocolError::Encode`] / [`ProtocolError::Decode`]).

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because codecs live inside long-lived
/// managers and stores that are shared across tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a request body.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes a response body.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`), the only format the
/// tournament API speaks.
///
/// ## Example
///
/// ```rust
/// use tourney_protocol::{Codec, JsonCodec, User};
///
/// let codec = JsonCodec;
/// let user: User = codec
///     .decode(br#"{"username":"alice","is_admin":true}"#)
///     .unwrap();
/// assert_eq!(user.username, "alice");
/// assert!(user.is_admin);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
