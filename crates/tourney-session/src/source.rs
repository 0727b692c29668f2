//! The credentials hook between sessions and stores.
//!
//! A resource store doesn't need a whole session manager. It needs one
//! thing: "give me the current bearer token, or tell me there isn't one".
//! [`TokenSource`] is exactly that, so a store can be driven by a
//! [`SessionManager`](crate::SessionManager) in an application and by a
//! [`StaticToken`] in tests or scripts.

use std::sync::Arc;

/// Supplies the bearer token for authenticated requests.
///
/// # Example
///
/// ```rust
/// use tourney_session::{StaticToken, TokenSource};
///
/// let anonymous = StaticToken::none();
/// assert_eq!(anonymous.bearer_token(), None);
///
/// let ci = StaticToken::new("eyJhbGciOi...");
/// assert_eq!(ci.bearer_token().as_deref(), Some("eyJhbGciOi..."));
/// ```
pub trait TokenSource: Send + Sync + 'static {
    /// The token to send as `Authorization: Bearer <token>`, verbatim.
    ///
    /// No validation happens here. An expired token is still returned and
    /// the server rejects it.
    fn bearer_token(&self) -> Option<String>;
}

impl<S: TokenSource + ?Sized> TokenSource for Arc<S> {
    fn bearer_token(&self) -> Option<String> {
        (**self).bearer_token()
    }
}

/// A fixed token (or none), for scripts and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    /// Always returns `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Never returns a token.
    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenSource for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}
