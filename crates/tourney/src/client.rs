//! `TourneyClient` builder and the assembled client.
//!
//! This ties the layers together: one HTTP transport shared by the session
//! manager and every store, with the session manager doubling as the
//! stores' token source.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tourney_protocol::Tournament;
use tourney_session::{
    Clock, FileStorage, MemoryStorage, Session, SessionConfig, SessionManager,
    TokenStorage,
};
use tourney_store::{Endpoint, RegistrationClient, ResourceStore};
use tourney_transport::ReqwestTransport;

use crate::TourneyError;

/// The transport every component of a [`TourneyClient`] shares.
pub type ClientTransport = Arc<ReqwestTransport>;

/// The session manager of a [`TourneyClient`].
pub type ClientSession = SessionManager<ClientTransport>;

/// The tournament collection of a [`TourneyClient`].
pub type TournamentStore = ResourceStore<Tournament, ClientTransport, Arc<ClientSession>>;

/// The registration client of a [`TourneyClient`].
pub type Registrations = RegistrationClient<ClientTransport, Arc<ClientSession>>;

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`TourneyClient`].
///
/// Deserializable, so it can come straight from a config file; any field
/// left out keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root URL of the API, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,

    /// Endpoint paths and the storage key for the token.
    pub session: SessionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            session: SessionConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Where the builder should keep the token.
enum StorageChoice {
    Memory,
    File(PathBuf),
    Custom(Arc<dyn TokenStorage>),
    None,
}

/// Builder for a [`TourneyClient`].
///
/// # Example
///
/// ```rust,no_run
/// use tourney::prelude::*;
///
/// # fn run() -> Result<(), TourneyError> {
/// let client = TourneyClient::builder()
///     .base_url("https://tourney.example.com")
///     .file_storage("/home/me/.config/tourney/session.json")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct TourneyClientBuilder {
    config: ClientConfig,
    storage: StorageChoice,
    clock: Option<Arc<dyn Clock>>,
}

impl TourneyClientBuilder {
    /// Creates a builder with default settings and in-memory token storage.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            storage: StorageChoice::Memory,
            clock: None,
        }
    }

    /// Sets the API root URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Keeps the token in memory (the default).
    pub fn memory_storage(mut self) -> Self {
        self.storage = StorageChoice::Memory;
        self
    }

    /// Keeps the token in a JSON file, so it survives restarts.
    pub fn file_storage(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage = StorageChoice::File(path.into());
        self
    }

    /// Keeps the token in a custom backend.
    pub fn storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.storage = StorageChoice::Custom(storage);
        self
    }

    /// Keeps no token at all.
    ///
    /// Login still updates the session, but no token is ever available
    /// afterwards, so authenticated calls fail with "Authentication
    /// required".
    pub fn without_storage(mut self) -> Self {
        self.storage = StorageChoice::None;
        self
    }

    /// Uses `clock` for token expiry checks instead of the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Assembles the client and restores any persisted session.
    ///
    /// # Errors
    /// Returns [`TourneyError::Transport`] if the base URL is invalid.
    pub fn build(self) -> Result<TourneyClient, TourneyError> {
        let transport: ClientTransport =
            Arc::new(ReqwestTransport::new(&self.config.base_url)?);

        let mut session =
            SessionManager::new(Arc::clone(&transport), self.config.session.clone());
        session = match self.storage {
            StorageChoice::Memory => session.with_storage(Arc::new(MemoryStorage::new())),
            StorageChoice::File(path) => session.with_storage(Arc::new(FileStorage::new(path))),
            StorageChoice::Custom(storage) => session.with_storage(storage),
            StorageChoice::None => session,
        };
        if let Some(clock) = self.clock {
            session = session.with_clock(clock);
        }
        let session = Arc::new(session);
        session.initialize();

        let tournaments = ResourceStore::new(
            Arc::clone(&transport),
            Arc::clone(&session),
            Endpoint::tournaments(),
        );
        let registrations =
            RegistrationClient::new(Arc::clone(&transport), Arc::clone(&session));

        tracing::info!(
            base_url = %self.config.base_url,
            authenticated = session.is_authenticated(),
            "client ready"
        );

        Ok(TourneyClient {
            config: self.config,
            session,
            tournaments,
            registrations,
        })
    }
}

impl Default for TourneyClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// TourneyClient
// ---------------------------------------------------------------------------

/// A ready-to-use client: session plus tournament and registration access.
pub struct TourneyClient {
    config: ClientConfig,
    session: Arc<ClientSession>,
    tournaments: TournamentStore,
    registrations: Registrations,
}

impl TourneyClient {
    /// Creates a new builder.
    pub fn builder() -> TourneyClientBuilder {
        TourneyClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The session manager.
    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    /// The tournament collection.
    pub fn tournaments(&self) -> &TournamentStore {
        &self.tournaments
    }

    /// Team registrations.
    pub fn registrations(&self) -> &Registrations {
        &self.registrations
    }

    /// Logs in. See [`SessionManager::login`].
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Session, TourneyError> {
        Ok(self.session.login(username, password).await?)
    }

    /// Logs out. See [`SessionManager::logout`].
    pub fn logout(&self) {
        self.session.logout();
    }
}
