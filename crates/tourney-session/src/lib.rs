//! Client-side authentication session for Tourney.
//!
//! This crate owns everything the client knows about "who is logged in":
//!
//! 1. **Tokens**: decoding a bearer token into [`Claims`] and deciding
//!    whether it is still usable ([`decode_and_validate`])
//! 2. **Persistence**: keeping the token across restarts behind the
//!    [`TokenStorage`] trait
//! 3. **Session state**: the observable [`Session`] (authenticated flag,
//!    admin flag, user identity) managed by [`SessionManager`]
//!
//! # How it fits in the stack
//!
//! ```text
//! Store Layer (above)  ← asks a TokenSource for the bearer token
//!     ↕
//! Session Layer (this crate)  ← login/logout, token validation, state
//!     ↕
//! Transport + Protocol (below)  ← HTTP requests, JSON records
//! ```

#![allow(async_fn_in_trait)]

mod claims;
mod clock;
mod error;
mod manager;
mod session;
mod source;
mod storage;

pub use claims::{decode_and_validate, decode_claims, Claims};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{SessionError, StorageError};
pub use manager::SessionManager;
pub use session::{Session, SessionConfig};
pub use source::{StaticToken, TokenSource};
pub use storage::{FileStorage, MemoryStorage, TokenStorage};
