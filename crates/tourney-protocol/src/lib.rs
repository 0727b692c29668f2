//! Wire protocol for the Tourney API.
//!
//! This crate defines the "language" the client and the tournament API
//! speak:
//!
//! - **Types** ([`Tournament`], [`Registration`], [`User`],
//!   [`TokenResponse`], [`ErrorBody`]): the JSON records that travel on
//!   the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those records are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw HTTP bodies) and the
//! session/store layers (typed records). It doesn't know about requests,
//! tokens or local state.
//!
//! ```text
//! Transport (bytes) → Protocol (records) → Session / Store (state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ErrorBody, Registration, TokenResponse, Tournament, User,
};
