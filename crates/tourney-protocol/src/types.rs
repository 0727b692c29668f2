//! Records exchanged with the tournament API.
//!
//! Every type here mirrors a JSON shape the backend produces or accepts.
//! Field names follow the backend (snake_case), so no renaming is needed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Success body of `POST /token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed bearer token.
    pub access_token: String,

    /// Always `"bearer"` in practice. Not required by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Identity of a logged-in user.
///
/// Returned by `GET /api/user/me`, and also what the session derives from
/// a token's claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,

    /// Missing means `false`.
    #[serde(default)]
    pub is_admin: bool,
}

// ---------------------------------------------------------------------------
// ErrorBody
// ---------------------------------------------------------------------------

/// Failure body of a non-2xx response: `{ "detail": ... }`.
///
/// `detail` is usually a string (`HTTPException(detail="...")`), but
/// request validation failures carry a list of `{ "msg": ..., "loc": ... }`
/// objects instead, so it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Extracts a human-readable message from a raw error body.
    ///
    /// - string `detail` → used verbatim (if non-empty)
    /// - list of objects with `msg` → the messages joined with `"; "`
    /// - anything else (no body, HTML, no `detail`) → `None`
    ///
    /// ```rust
    /// use tourney_protocol::ErrorBody;
    ///
    /// let msg = ErrorBody::detail_from(br#"{"detail":"Tournament 9 not found"}"#);
    /// assert_eq!(msg.as_deref(), Some("Tournament 9 not found"));
    /// assert_eq!(ErrorBody::detail_from(b"Internal Server Error"), None);
    /// ```
    pub fn detail_from(body: &[u8]) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
        parsed.message()
    }

    /// Returns the message carried by `detail`, if any.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if msgs.is_empty() {
                    None
                } else {
                    Some(msgs.join("; "))
                }
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tournament
// ---------------------------------------------------------------------------

/// A tournament record.
///
/// `id` is assigned by the server, so it is `None` in a create payload.
/// Dates are ISO `YYYY-MM-DD` strings, exactly as the backend stores them.
///
/// Fields the client doesn't model are kept in `extra` so that an
/// update built from a fetched record doesn't silently drop them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tournament {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub sport: String,
    pub start_date: String,
    pub end_date: String,
    pub registration_deadline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub max_teams: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_teams: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tournament {
    /// Number of team slots still free, if the server reported a count.
    pub fn open_slots(&self) -> Option<u32> {
        self.current_teams
            .map(|current| self.max_teams.saturating_sub(current))
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// A team's registration for a tournament.
///
/// `id` and `registration_date` are filled in by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub tournament_id: String,
    pub team_name: String,
    pub captain_name: String,
    pub captain_email: String,
    #[serde(default)]
    pub player_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<String>,
}

// =========================================================================
// Tests
// =========================================================================
