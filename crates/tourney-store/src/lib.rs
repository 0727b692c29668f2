//! Remote-backed resource collections for Tourney.
//!
//! A [`ResourceStore`] keeps a local copy of a server collection (for
//! example every tournament) and exposes the usual list/get/create/update/
//! delete operations. Local state only changes after the server confirms a
//! call, and every change is published through a `tokio::sync::watch`
//! channel so views can re-render.
//!
//! # Key types
//!
//! - [`Resource`]: what a record must provide (its `id`)
//! - [`Endpoint`]: where a collection lives and how to name it in errors
//! - [`ResourceStore`]: the collection cache and its operations
//! - [`StoreState`]: items, loading flag, last error
//! - [`RegistrationClient`]: team registrations, which aren't cached

#![allow(async_fn_in_trait)]

mod error;
mod registrations;
mod resource;
mod store;

pub use error::StoreError;
pub use registrations::RegistrationClient;
pub use resource::{Endpoint, Resource};
pub use store::{ResourceStore, StoreState};
