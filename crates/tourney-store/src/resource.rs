//! The `Resource` trait and collection endpoints.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tourney_protocol::Tournament;

/// A record the server stores in a collection.
///
/// Implementors must be JSON round-trippable. The only thing a store needs
/// to know about a record beyond that is its identifier, which is `None`
/// until the server has assigned one.
pub trait Resource:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    /// The server-assigned identifier.
    fn id(&self) -> Option<&str>;
}

impl Resource for Tournament {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Untyped records: the `id` field, if it is a string.
impl Resource for Value {
    fn id(&self) -> Option<&str> {
        self.get("id").and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// Where a collection lives and what it is called.
///
/// The names only show up in fallback error messages
/// ("Failed to fetch tournaments", "Failed to delete tournament").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Collection path, e.g. `/api/tournaments`. Items live at
    /// `{path}/{id}`.
    pub path: String,
    pub singular: String,
    pub plural: String,
}

impl Endpoint {
    pub fn new(
        path: impl Into<String>,
        singular: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            singular: singular.into(),
            plural: plural.into(),
        }
    }

    /// `/api/tournaments`.
    pub fn tournaments() -> Self {
        Self::new("/api/tournaments", "tournament", "tournaments")
    }

    /// Path of a single item.
    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path.trim_end_matches('/'), id)
    }
}
