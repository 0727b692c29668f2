//! The resource store: a local cache of one server collection.
//!
//! ## Consistency rules
//!
//! - The collection is only changed AFTER the server confirms the call.
//!   A failed create/update/delete leaves it exactly as it was.
//! - Mutating calls need a bearer token. Without one they fail with
//!   [`StoreError::AuthRequired`] and nothing is sent.
//! - `list` reports failure through [`StoreState::error`] as well as its
//!   return value, since views usually render the state, not the call.
//!   Mutations only report through their return value.
//!
//! All state changes go through one `watch::Sender`, and no lock is held
//! across an await.

use tokio::sync::watch;
use tourney_protocol::{Codec, ErrorBody, JsonCodec};
use tourney_session::TokenSource;
use tourney_transport::{ApiRequest, ApiResponse, HttpTransport};

use crate::{Endpoint, Resource, StoreError};

// ---------------------------------------------------------------------------
// StoreState
// ---------------------------------------------------------------------------

/// Observable state of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState<R> {
    /// The cached collection, in server order.
    pub items: Vec<R>,

    /// `true` while a `list` call is in flight.
    pub loading: bool,

    /// Message of the last failed `list`, cleared when the next one starts.
    pub error: Option<String>,
}

impl<R> Default for StoreState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Sets `loading` on creation and clears it on drop.
///
/// Dropping covers every exit: success, error, and the caller dropping
/// the `list` future mid-request.
struct LoadingGuard<'a, R> {
    state: &'a watch::Sender<StoreState<R>>,
}

impl<'a, R> LoadingGuard<'a, R> {
    fn start(state: &'a watch::Sender<StoreState<R>>) -> Self {
        state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        Self { state }
    }
}

impl<R> Drop for LoadingGuard<'_, R> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}

// ---------------------------------------------------------------------------
// Shared request helpers
// ---------------------------------------------------------------------------

/// The bearer token, or [`StoreError::AuthRequired`].
///
/// Every authenticated operation calls this before building its request.
pub(crate) fn authorized<S: TokenSource>(tokens: &S) -> Result<String, StoreError> {
    tokens.bearer_token().ok_or(StoreError::AuthRequired)
}

/// Passes 2xx responses through and turns anything else into
/// [`StoreError::Server`], preferring the server's `detail` over
/// `fallback`.
pub(crate) fn expect_success(
    response: ApiResponse,
    fallback: impl FnOnce() -> String,
) -> Result<ApiResponse, StoreError> {
    if response.is_success() {
        return Ok(response);
    }
    let message = ErrorBody::detail_from(&response.body).unwrap_or_else(fallback);
    Err(StoreError::Server {
        status: response.status,
        message,
    })
}

// ---------------------------------------------------------------------------
// ResourceStore
// ---------------------------------------------------------------------------

/// Local cache and operations for one collection of `R`.
///
/// ```text
/// list()            GET    {path}       replace items
/// get(id)           GET    {path}/{id}  (items untouched)
/// create(data)      POST   {path}       append        [auth]
/// update(id, data)  PUT    {path}/{id}  replace by id [auth]
/// delete(id)        DELETE {path}/{id}  remove by id  [auth]
/// ```
pub struct ResourceStore<R: Resource, T: HttpTransport, S: TokenSource> {
    transport: T,
    tokens: S,
    endpoint: Endpoint,
    codec: JsonCodec,
    state: watch::Sender<StoreState<R>>,
}

impl<R: Resource, T: HttpTransport, S: TokenSource> ResourceStore<R, T, S> {
    /// Creates an empty store for the collection at `endpoint`.
    pub fn new(transport: T, tokens: S, endpoint: Endpoint) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            transport,
            tokens,
            endpoint,
            codec: JsonCodec,
            state,
        }
    }

    /// The collection this store mirrors.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Fetches the whole collection and replaces the cached items.
    ///
    /// On failure the items are left as they were and
    /// [`StoreState::error`] is set: "Failed to fetch {plural}" for a
    /// non-2xx answer, the underlying error's message otherwise. `loading`
    /// is `false` again once this returns (or is dropped).
    pub async fn list(&self) -> Result<(), StoreError> {
        let _loading = LoadingGuard::start(&self.state);

        match self.fetch_all().await {
            Ok(items) => {
                tracing::debug!(
                    collection = %self.endpoint.plural,
                    count = items.len(),
                    "collection loaded"
                );
                self.state.send_modify(|s| s.items = items);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    collection = %self.endpoint.plural,
                    error = %e,
                    "loading collection failed"
                );
                let message = e.to_string();
                self.state.send_modify(|s| s.error = Some(message));
                Err(e)
            }
        }
    }

    async fn fetch_all(&self) -> Result<Vec<R>, StoreError> {
        let request = ApiRequest::get(self.endpoint.path.as_str());
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(StoreError::Server {
                status: response.status,
                message: format!("Failed to fetch {}", self.endpoint.plural),
            });
        }
        Ok(self.codec.decode(&response.body)?)
    }

    /// Fetches one item. The cached collection is not touched.
    ///
    /// # Errors
    /// A non-2xx answer is always "Failed to fetch {singular}"; the
    /// server's detail is not used here.
    pub async fn get(&self, id: &str) -> Result<R, StoreError> {
        let request = ApiRequest::get(self.endpoint.item_path(id));
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            tracing::warn!(id, status = response.status, "fetching item failed");
            return Err(StoreError::Server {
                status: response.status,
                message: format!("Failed to fetch {}", self.endpoint.singular),
            });
        }
        Ok(self.codec.decode(&response.body)?)
    }

    /// Creates an item and appends the server's copy to the collection.
    pub async fn create(&self, data: &R) -> Result<R, StoreError> {
        let token = authorized(&self.tokens)?;
        let request = ApiRequest::post(self.endpoint.path.as_str())
            .bearer(token)
            .json(self.codec.encode(data)?);

        let response = expect_success(self.transport.send(request).await?, || {
            self.fallback("create")
        })?;
        let created: R = self.codec.decode(&response.body)?;

        tracing::info!(
            id = created.id().unwrap_or_default(),
            kind = %self.endpoint.singular,
            "created"
        );
        self.state.send_modify(|s| s.items.push(created.clone()));
        Ok(created)
    }

    /// Updates item `id` and swaps the server's copy into the collection.
    ///
    /// Every cached item whose id equals `id` is replaced in place, so
    /// order and length are preserved.
    pub async fn update(&self, id: &str, data: &R) -> Result<R, StoreError> {
        let token = authorized(&self.tokens)?;
        let request = ApiRequest::put(self.endpoint.item_path(id))
            .bearer(token)
            .json(self.codec.encode(data)?);

        let response = expect_success(self.transport.send(request).await?, || {
            self.fallback("update")
        })?;
        let updated: R = self.codec.decode(&response.body)?;

        tracing::info!(id, kind = %self.endpoint.singular, "updated");
        self.state.send_modify(|s| {
            for item in s.items.iter_mut().filter(|item| item.id() == Some(id)) {
                *item = updated.clone();
            }
        });
        Ok(updated)
    }

    /// Deletes item `id` and drops it from the collection.
    ///
    /// Returns `true` on success. The response body is ignored.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let token = authorized(&self.tokens)?;
        let request = ApiRequest::delete(self.endpoint.item_path(id)).bearer(token);

        expect_success(self.transport.send(request).await?, || {
            self.fallback("delete")
        })?;

        tracing::info!(id, kind = %self.endpoint.singular, "deleted");
        self.state
            .send_modify(|s| s.items.retain(|item| item.id() != Some(id)));
        Ok(true)
    }

    fn fallback(&self, action: &str) -> String {
        format!("Failed to {action} {}", self.endpoint.singular)
    }

    // =====================================================================
    // Observable state
    // =====================================================================

    /// A snapshot of the whole state.
    pub fn state(&self) -> StoreState<R> {
        self.state.borrow().clone()
    }

    /// A snapshot of the cached items.
    pub fn items(&self) -> Vec<R> {
        self.state.borrow().items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<StoreState<R>> {
        self.state.subscribe()
    }
}
