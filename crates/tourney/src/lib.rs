//! # Tourney
//!
//! Client for the Tourney tournament API.
//!
//! Tourney keeps two kinds of client-side state in sync with the server:
//! the login session (who you are, whether you're an admin) and cached
//! resource collections (tournaments). Both are observable: subscribe to
//! them and re-render when they change.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tourney::prelude::*;
//!
//! # async fn run() -> Result<(), TourneyError> {
//! let client = TourneyClient::builder()
//!     .base_url("http://127.0.0.1:8000")
//!     .build()?;
//!
//! client.login("admin", "admin123").await?;
//! client.tournaments().list().await?;
//! for t in client.tournaments().items() {
//!     println!("{} ({})", t.name, t.sport);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{
    ClientConfig, ClientSession, ClientTransport, Registrations, TournamentStore,
    TourneyClient, TourneyClientBuilder,
};
pub use error::TourneyError;

/// Sub-crates, for anything the prelude doesn't cover.
pub use tourney_protocol as protocol;
pub use tourney_session as session;
pub use tourney_store as store;
pub use tourney_transport as transport;

/// Common imports for working with Tourney.
///
/// ```rust
/// use tourney::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{ClientConfig, TourneyClient, TourneyClientBuilder, TourneyError};
    pub use tourney_protocol::{Registration, Tournament, User};
    pub use tourney_session::{
        FileStorage, MemoryStorage, Session, SessionConfig, SessionError, TokenStorage,
    };
    pub use tourney_store::{Endpoint, Resource, StoreError, StoreState};
}
