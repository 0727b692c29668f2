//! Session types: what the client knows about the logged-in user.
//!
//! A [`Session`] is derived entirely from a decoded token. It is never
//! edited field by field: it's replaced wholesale on login, on init, and
//! on logout.

use serde::{Deserialize, Serialize};
use tourney_protocol::User;

use crate::Claims;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Where the session talks to and where it keeps its token.
///
/// The defaults match the tournament API; override only for a backend
/// mounted at different paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Storage key the token is persisted under.
    pub token_key: String,

    /// Path of the form-encoded login endpoint.
    pub token_path: String,

    /// Path of the "who am I" endpoint.
    pub user_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: "token".to_string(),
            token_path: "/token".to_string(),
            user_path: "/api/user/me".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The client-local record of who is logged in.
///
/// `Session::default()` is the logged-out state: not authenticated, not
/// admin, no user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    pub is_admin: bool,
    pub user: Option<User>,
}

impl Session {
    /// Builds the logged-in session described by `claims`.
    pub fn from_claims(claims: &Claims) -> Self {
        let user = claims.user();
        Self {
            authenticated: true,
            is_admin: user.is_admin,
            user: Some(user),
        }
    }

    /// Username of the logged-in user, if any.
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}
