//! The session manager: login, logout, and the observable session state.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Restoring the session from a persisted token at startup
//! - Logging in against the token endpoint and persisting the result
//! - Logging out (purging the token)
//! - Handing the raw token to whoever needs to make authenticated calls
//! - Publishing every session change to subscribers
//!
//! # Observable state
//!
//! The current [`Session`] lives in a `tokio::sync::watch` channel. The
//! manager is the only writer. UIs and other components call
//! [`SessionManager::subscribe`] and await `changed()` to react to logins
//! and logouts, or take a snapshot with [`SessionManager::session`].
//!
//! # Storage-less mode
//!
//! A manager built without a [`TokenStorage`] behaves like code running
//! outside a browser: `init` does nothing, `get_token` is always `None`,
//! and nothing is ever persisted. Login still updates the in-memory
//! session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tourney_protocol::{
    Codec, ErrorBody, JsonCodec, ProtocolError, TokenResponse, User,
};
use tourney_transport::{ApiRequest, HttpTransport};

use crate::{
    decode_and_validate, decode_claims, Clock, Session, SessionConfig,
    SessionError, SystemClock, TokenSource, TokenStorage,
};

/// Message used when the token endpoint fails without a `detail`.
const LOGIN_FAILED: &str = "Login failed";

/// Message used when `/api/user/me` fails without a `detail`.
const USER_FETCH_FAILED: &str = "Failed to fetch user";

/// Owns the client's authentication state.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ initialize() ──→ login() ⇄ logout()
///               │
///               ├─ valid token in storage   → authenticated
///               └─ missing/expired/garbage  → purged, logged out
/// ```
pub struct SessionManager<T: HttpTransport> {
    transport: T,
    storage: Option<Arc<dyn TokenStorage>>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    codec: JsonCodec,
    state: watch::Sender<Session>,
    initialized: AtomicBool,
}

impl<T: HttpTransport> SessionManager<T> {
    /// Creates a logged-out manager with no storage and the system clock.
    ///
    /// Add storage with [`with_storage`](Self::with_storage), then call
    /// [`initialize`](Self::initialize) once.
    pub fn new(transport: T, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            transport,
            storage: None,
            clock: Arc::new(SystemClock),
            config,
            codec: JsonCodec,
            state,
            initialized: AtomicBool::new(false),
        }
    }

    /// Persists the token in `storage`.
    pub fn with_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Uses `clock` for expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // =====================================================================
    // Startup
    // =====================================================================

    /// Runs [`init`](Self::init) the first time it is called.
    ///
    /// Returns `true` if this call did the initialization, `false` if it
    /// had already happened. Safe to call from several startup paths.
    pub fn initialize(&self) -> bool {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.init();
        true
    }

    /// Restores the session from the persisted token.
    ///
    /// A valid token sets the session from its claims. A missing, malformed
    /// or expired token is purged and the session reset to logged out;
    /// this never fails. Without storage this is a no-op.
    pub fn init(&self) {
        let Some(storage) = &self.storage else {
            tracing::debug!("no token storage, skipping session restore");
            return;
        };

        let token = match storage.load(&self.config.token_key) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "reading persisted token failed");
                None
            }
        };

        let now = self.clock.unix_timestamp();
        match decode_and_validate(token.as_deref(), now) {
            Some(claims) => {
                let session = Session::from_claims(&claims);
                tracing::info!(
                    username = %claims.sub,
                    is_admin = session.is_admin,
                    "session restored"
                );
                self.state.send_replace(session);
            }
            None => {
                if token.is_some() {
                    tracing::info!("discarding expired or invalid token");
                }
                self.purge_token(storage.as_ref());
                self.state.send_replace(Session::default());
            }
        }
    }

    // =====================================================================
    // Login / logout
    // =====================================================================

    /// Logs in with a username and password.
    ///
    /// On success the token is persisted, the session replaced, and the
    /// new session returned.
    ///
    /// # Errors
    /// - [`SessionError::LoginFailed`]: non-2xx; carries the server's
    ///   `detail` or "Login failed"
    /// - [`SessionError::Transport`]: no response
    /// - [`SessionError::Protocol`] / [`SessionError::InvalidToken`]: the
    ///   success body or its token couldn't be decoded
    /// - [`SessionError::Storage`]: the token couldn't be persisted
    ///
    /// The session is left untouched on every error path.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Session, SessionError> {
        match self.request_token(username, password).await {
            Ok(session) => Ok(session),
            Err(e) => {
                tracing::warn!(username, error = %e, "login failed");
                Err(e)
            }
        }
    }

    async fn request_token(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Session, SessionError> {
        let request = ApiRequest::post(self.config.token_path.as_str())
            .form([("username", username), ("password", password)]);
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let message = ErrorBody::detail_from(&response.body)
                .unwrap_or_else(|| LOGIN_FAILED.to_string());
            return Err(SessionError::LoginFailed(message));
        }

        let TokenResponse { access_token, .. } =
            self.codec.decode(&response.body)?;
        if access_token.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "token response has an empty access_token".into(),
            )
            .into());
        }
        let claims = decode_claims(&access_token)?;

        if let Some(storage) = &self.storage {
            storage.store(&self.config.token_key, &access_token)?;
        }

        let session = Session::from_claims(&claims);
        self.state.send_replace(session.clone());
        tracing::info!(
            username = %claims.sub,
            is_admin = session.is_admin,
            "logged in"
        );
        Ok(session)
    }

    /// Forgets the token and resets to logged out. No network call.
    ///
    /// Always succeeds; a storage failure is logged. Calling it again is
    /// harmless.
    pub fn logout(&self) {
        if let Some(storage) = &self.storage {
            self.purge_token(storage.as_ref());
        }
        self.state.send_replace(Session::default());
        tracing::info!("logged out");
    }

    fn purge_token(&self, storage: &dyn TokenStorage) {
        if let Err(e) = storage.remove(&self.config.token_key) {
            tracing::warn!(error = %e, "removing persisted token failed");
        }
    }

    // =====================================================================
    // Token access
    // =====================================================================

    /// Returns the persisted token verbatim, or `None` without storage.
    ///
    /// No validation: callers that care whether the token is still usable
    /// go through [`decode_and_validate`].
    pub fn get_token(&self) -> Option<String> {
        let storage = self.storage.as_ref()?;
        match storage.load(&self.config.token_key) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "reading persisted token failed");
                None
            }
        }
    }

    /// Asks the server who the current token belongs to.
    ///
    /// # Errors
    /// - [`SessionError::NotAuthenticated`]: no token; nothing is sent
    /// - [`SessionError::Rejected`]: non-2xx (e.g. expired token)
    /// - [`SessionError::Transport`] / [`SessionError::Protocol`]
    pub async fn current_user(&self) -> Result<User, SessionError> {
        let token = self.get_token().ok_or(SessionError::NotAuthenticated)?;
        let request =
            ApiRequest::get(self.config.user_path.as_str()).bearer(token);
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let message = ErrorBody::detail_from(&response.body)
                .unwrap_or_else(|| USER_FETCH_FAILED.to_string());
            tracing::warn!(status = response.status, %message, "fetching current user failed");
            return Err(SessionError::Rejected {
                status: response.status,
                message,
            });
        }

        Ok(self.codec.decode(&response.body)?)
    }

    // =====================================================================
    // Observable state
    // =====================================================================

    /// A snapshot of the current session.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Subscribes to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Shorthand for `session().authenticated`.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().authenticated
    }

    /// Shorthand for `session().is_admin`.
    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin
    }

    /// Shorthand for `session().user`.
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }
}

impl<T: HttpTransport> TokenSource for SessionManager<T> {
    fn bearer_token(&self) -> Option<String> {
        self.get_token()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionManager`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //!
    //! The network is replaced by `ScriptedTransport`, which hands out
    //! canned responses in order and records every request it sees. Time
    //! is pinned with `FixedClock`, so expiry is deterministic.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tourney_transport::{ApiResponse, Body, Method, TransportError};

    use super::*;
    use crate::claims::tests::{make_token, NOW};
    use crate::{FixedClock, MemoryStorage};

    // -- Helpers ----------------------------------------------------------

    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        fn respond(self, status: u16, body: serde_json::Value) -> Self {
            self.responses.lock().unwrap().push_back(Ok(ApiResponse::new(
                status,
                serde_json::to_vec(&body).unwrap(),
            )));
            self
        }

        fn respond_raw(self, status: u16, body: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(ApiResponse::new(status, body.as_bytes())));
            self
        }

        fn fail(self) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(TransportError::InvalidUrl("unreachable".into())));
            self
        }

        fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl HttpTransport for ScriptedTransport {
        async fn send(
            &self,
            request: ApiRequest,
        ) -> Result<ApiResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request")
        }
    }

    /// A manager with in-memory storage and the clock pinned at `NOW`.
    /// Returns the storage too, so tests can inspect what was persisted.
    fn manager(
        transport: ScriptedTransport,
    ) -> (SessionManager<Arc<ScriptedTransport>>, Arc<MemoryStorage>, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let storage = Arc::new(MemoryStorage::new());
        let mgr = SessionManager::new(Arc::clone(&transport), SessionConfig::default())
            .with_storage(storage.clone())
            .with_clock(Arc::new(FixedClock::new(NOW)));
        (mgr, storage, transport)
    }

    fn stored(storage: &MemoryStorage) -> Option<String> {
        storage.load("token").unwrap()
    }

    // =====================================================================
    // init() / initialize()
    // =====================================================================

    #[test]
    fn test_init_valid_token_restores_session() {
        let (mgr, storage, _) = manager(ScriptedTransport::default());
        let token = make_token("alice", NOW + 600, Some(true));
        storage.store("token", &token).unwrap();

        mgr.init();

        let session = mgr.session();
        assert!(session.authenticated);
        assert!(session.is_admin);
        assert_eq!(session.username(), Some("alice"));
        assert_eq!(stored(&storage), Some(token), "valid token is kept");
    }

    #[test]
    fn test_init_missing_admin_claim_restores_non_admin() {
        let (mgr, storage, _) = manager(ScriptedTransport::default());
        storage
            .store("token", &make_token("bob", NOW + 600, None))
            .unwrap();

        mgr.init();

        assert!(mgr.is_authenticated());
        assert!(!mgr.is_admin());
        assert_eq!(mgr.user().map(|u| u.is_admin), Some(false));
    }

    #[test]
    fn test_init_expired_token_purges_and_logs_out() {
        let (mgr, storage, _) = manager(ScriptedTransport::default());
        storage
            .store("token", &make_token("alice", NOW - 1, Some(true)))
            .unwrap();

        mgr.init();

        assert_eq!(mgr.session(), Session::default());
        assert_eq!(stored(&storage), None, "expired token must be purged");
    }

    #[test]
    fn test_init_garbage_token_purges_and_logs_out() {
        let (mgr, storage, _) = manager(ScriptedTransport::default());
        storage.store("token", "definitely-not-a-jwt").unwrap();

        mgr.init();

        assert_eq!(mgr.session(), Session::default());
        assert_eq!(stored(&storage), None);
    }

    #[test]
    fn test_init_no_token_stays_logged_out() {
        let (mgr, _, _) = manager(ScriptedTransport::default());

        mgr.init();

        assert_eq!(mgr.session(), Session::default());
    }

    #[test]
    fn test_initialize_runs_only_once() {
        let (mgr, storage, _) = manager(ScriptedTransport::default());

        assert!(mgr.initialize(), "first call initializes");

        // A token appearing later is NOT picked up by a second initialize.
        storage
            .store("token", &make_token("alice", NOW + 600, None))
            .unwrap();
        assert!(!mgr.initialize(), "second call is a no-op");
        assert!(!mgr.is_authenticated());
    }

    #[test]
    fn test_init_without_storage_is_noop() {
        let mgr = SessionManager::new(
            ScriptedTransport::default(),
            SessionConfig::default(),
        );

        assert!(mgr.initialize());

        assert_eq!(mgr.session(), Session::default());
        assert_eq!(mgr.get_token(), None);
    }

    // =====================================================================
    // login()
    // =====================================================================

    #[tokio::test]
    async fn test_login_success_sets_session_and_persists_token() {
        let token = make_token("alice", NOW + 1800, Some(true));
        let (mgr, storage, transport) = manager(
            ScriptedTransport::default().respond(
                200,
                serde_json::json!({ "access_token": token, "token_type": "bearer" }),
            ),
        );

        let session = mgr.login("alice", "password").await.expect("login ok");

        assert_eq!(
            session,
            Session {
                authenticated: true,
                is_admin: true,
                user: Some(User {
                    username: "alice".into(),
                    is_admin: true,
                }),
            }
        );
        assert_eq!(mgr.session(), session);
        assert_eq!(stored(&storage), Some(token));

        // The request was a form POST to /token.
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path, "/token");
        assert_eq!(
            requests[0].body,
            Body::Form(vec![
                ("username".into(), "alice".into()),
                ("password".into(), "password".into()),
            ])
        );
    }

    #[tokio::test]
    async fn test_login_rejected_returns_server_detail() {
        let (mgr, storage, _) = manager(ScriptedTransport::default().respond(
            401,
            serde_json::json!({ "detail": "Incorrect username or password" }),
        ));

        let result = mgr.login("alice", "wrong").await;

        match result {
            Err(SessionError::LoginFailed(msg)) => {
                assert_eq!(msg, "Incorrect username or password");
            }
            other => panic!("expected LoginFailed, got {other:?}"),
        }
        assert_eq!(mgr.session(), Session::default());
        assert_eq!(stored(&storage), None);
    }

    #[tokio::test]
    async fn test_login_rejected_without_detail_uses_generic_message() {
        let (mgr, _, _) = manager(
            ScriptedTransport::default().respond_raw(502, "<h1>Bad Gateway</h1>"),
        );

        let err = mgr.login("alice", "pw").await.unwrap_err();

        assert_eq!(err.to_string(), "Login failed");
    }

    #[tokio::test]
    async fn test_login_transport_failure_returns_error() {
        let (mgr, _, _) = manager(ScriptedTransport::default().fail());

        let result = mgr.login("alice", "pw").await;

        assert!(matches!(result, Err(SessionError::Transport(_))));
        assert!(!mgr.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_undecodable_token_is_not_persisted() {
        let (mgr, storage, _) = manager(ScriptedTransport::default().respond(
            200,
            serde_json::json!({ "access_token": "garbage" }),
        ));

        let result = mgr.login("alice", "pw").await;

        assert!(matches!(result, Err(SessionError::InvalidToken(_))));
        assert_eq!(stored(&storage), None);
        assert!(!mgr.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_empty_access_token_returns_protocol_error() {
        let (mgr, storage, _) = manager(ScriptedTransport::default().respond(
            200,
            serde_json::json!({ "access_token": "", "token_type": "bearer" }),
        ));

        let result = mgr.login("alice", "pw").await;

        assert!(matches!(
            result,
            Err(SessionError::Protocol(ProtocolError::InvalidMessage(_)))
        ));
        assert_eq!(stored(&storage), None);
    }

    #[tokio::test]
    async fn test_login_notifies_subscribers() {
        let token = make_token("carol", NOW + 60, None);
        let (mgr, _, _) = manager(
            ScriptedTransport::default()
                .respond(200, serde_json::json!({ "access_token": token })),
        );
        let mut rx = mgr.subscribe();

        mgr.login("carol", "pw").await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().username(), Some("carol"));
    }

    #[tokio::test]
    async fn test_login_without_storage_updates_session_only() {
        let token = make_token("dave", NOW + 60, None);
        let transport = ScriptedTransport::default()
            .respond(200, serde_json::json!({ "access_token": token }));
        let mgr = SessionManager::new(transport, SessionConfig::default());

        mgr.login("dave", "pw").await.unwrap();

        assert!(mgr.is_authenticated());
        assert_eq!(mgr.get_token(), None);
    }

    // =====================================================================
    // logout()
    // =====================================================================

    #[test]
    fn test_logout_clears_session_and_storage() {
        let (mgr, storage, _) = manager(ScriptedTransport::default());
        storage
            .store("token", &make_token("alice", NOW + 600, Some(true)))
            .unwrap();
        mgr.init();
        assert!(mgr.is_authenticated());

        mgr.logout();

        assert_eq!(mgr.session(), Session::default());
        assert_eq!(stored(&storage), None);
    }

    #[test]
    fn test_logout_twice_is_idempotent() {
        let (mgr, storage, transport) = manager(ScriptedTransport::default());
        storage
            .store("token", &make_token("alice", NOW + 600, None))
            .unwrap();
        mgr.init();

        mgr.logout();
        let first = (mgr.session(), stored(&storage));
        mgr.logout();
        let second = (mgr.session(), stored(&storage));

        assert_eq!(first, second);
        assert_eq!(second, (Session::default(), None));
        assert!(transport.requests().is_empty(), "logout never hits the network");
    }

    #[tokio::test]
    async fn test_corrupt_token_file_is_purged_and_login_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, br#"{"token": "trunc"#).unwrap();
        let token = make_token("alice", NOW + 600, Some(false));
        let transport = ScriptedTransport::default()
            .respond(200, serde_json::json!({ "access_token": token }));
        let storage = Arc::new(crate::FileStorage::new(&path));
        let mgr = SessionManager::new(transport, SessionConfig::default())
            .with_storage(storage.clone())
            .with_clock(Arc::new(FixedClock::new(NOW)));

        assert!(mgr.initialize());
        assert_eq!(mgr.session(), Session::default());
        assert_eq!(storage.load("token").unwrap(), None, "init purges the file");

        mgr.logout();
        let session = mgr.login("alice", "pw").await.expect("login recovers");

        assert!(session.authenticated);
        assert_eq!(storage.load("token").unwrap(), Some(token));
    }

    // =====================================================================
    // get_token() / TokenSource
    // =====================================================================

    #[test]
    fn test_get_token_returns_stored_value_verbatim() {
        // Even an expired token comes back unchanged: no validation here.
        let (mgr, storage, _) = manager(ScriptedTransport::default());
        let token = make_token("alice", NOW - 600, None);
        storage.store("token", &token).unwrap();

        assert_eq!(mgr.get_token(), Some(token.clone()));
        assert_eq!(mgr.bearer_token(), Some(token));
    }

    // =====================================================================
    // current_user()
    // =====================================================================

    #[tokio::test]
    async fn test_current_user_without_token_sends_nothing() {
        let (mgr, _, transport) = manager(ScriptedTransport::default());

        let result = mgr.current_user().await;

        assert!(matches!(result, Err(SessionError::NotAuthenticated)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_current_user_sends_bearer_and_decodes_user() {
        let (mgr, storage, transport) = manager(ScriptedTransport::default().respond(
            200,
            serde_json::json!({ "username": "alice", "is_admin": true }),
        ));
        storage.store("token", "tok").unwrap();

        let user = mgr.current_user().await.unwrap();

        assert_eq!(user.username, "alice");
        assert!(user.is_admin);
        let requests = transport.requests();
        assert_eq!(requests[0].path, "/api/user/me");
        assert_eq!(requests[0].bearer.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_current_user_rejected_carries_status_and_detail() {
        let (mgr, storage, _) = manager(ScriptedTransport::default().respond(
            401,
            serde_json::json!({ "detail": "Could not validate credentials" }),
        ));
        storage.store("token", "stale").unwrap();

        let err = mgr.current_user().await.unwrap_err();

        assert!(matches!(err, SessionError::Rejected { status: 401, .. }));
        assert_eq!(err.to_string(), "Could not validate credentials");
    }
}
