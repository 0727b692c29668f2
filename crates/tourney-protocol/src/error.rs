//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
///
/// When you see a `ProtocolError`, the server did answer, but what it
/// sent (or what we tried to send) isn't the JSON shape we expected.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into a request body).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a response body into a Rust value).
    ///
    /// Common causes: an HTML error page instead of JSON, missing
    /// required fields, or wrong data types.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The body parsed but violates the API contract, e.g. a token
    /// response with an empty `access_token`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
