/// Errors that can occur in the transport layer.
///
/// Only failures to obtain a response live here. A server that answers
/// with 4xx/5xx produced a perfectly good response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The base URL or a request path could not be turned into a URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The request could not be sent or no response arrived.
    #[cfg(feature = "reqwest")]
    #[error("request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    /// The response body could not be read.
    #[cfg(feature = "reqwest")]
    #[error("reading response body failed: {0}")]
    ReadFailed(#[source] reqwest::Error),
}
