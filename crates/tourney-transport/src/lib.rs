//! HTTP transport abstraction layer for Tourney.
//!
//! Provides the [`HttpTransport`] trait that abstracts over the HTTP client
//! used to reach the tournament API, plus the plain request/response values
//! that travel through it ([`ApiRequest`], [`ApiResponse`]).
//!
//! Higher layers (session, store) only ever build an [`ApiRequest`] and look
//! at the status and body of the [`ApiResponse`]. They never see a concrete
//! HTTP client, which keeps them testable with a scripted transport.
//!
//! # Feature Flags
//!
//! - `reqwest` (default): HTTP transport via `reqwest`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "reqwest")]
mod client;

pub use error::TransportError;
#[cfg(feature = "reqwest")]
pub use client::ReqwestTransport;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Method / Body
// ---------------------------------------------------------------------------

/// The HTTP methods the tournament API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Request payload.
///
/// The transport is responsible for setting the matching `Content-Type`
/// header: `application/json` for [`Body::Json`] and
/// `application/x-www-form-urlencoded` for [`Body::Form`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Body {
    /// No body at all (GET, DELETE).
    #[default]
    Empty,
    /// Already-encoded JSON bytes.
    Json(Vec<u8>),
    /// Form fields, encoded in order.
    Form(Vec<(String, String)>),
}

// ---------------------------------------------------------------------------
// ApiRequest
// ---------------------------------------------------------------------------

/// A single request against the API, relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute path on the API host, e.g. `/api/tournaments/42`.
    pub path: String,
    /// Bearer token sent as `Authorization: Bearer <token>`, if any.
    pub bearer: Option<String>,
    /// Request payload.
    pub body: Body,
}

impl ApiRequest {
    /// Creates a request with no bearer token and no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: Body::Empty,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Shorthand for a `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Shorthand for a `PUT` request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// Shorthand for a `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attaches a bearer token.
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Sets an already-encoded JSON body.
    pub fn json(mut self, bytes: Vec<u8>) -> Self {
        self.body = Body::Json(bytes);
        self
    }

    /// Sets a form-encoded body.
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Body::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }
}

// ---------------------------------------------------------------------------
// ApiResponse
// ---------------------------------------------------------------------------

/// The raw outcome of a request that reached the server.
///
/// A non-2xx status is NOT a transport error: the server answered, and
/// interpreting the answer is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Creates a response from a status code and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

/// Sends requests to the tournament API.
///
/// `Send + Sync + 'static` so a transport can be shared between the session
/// manager and every store, and used from spawned tasks.
pub trait HttpTransport: Send + Sync + 'static {
    /// Sends one request and waits for the full response.
    ///
    /// Returns `Err` only when no response was obtained (connection refused,
    /// DNS failure, broken body). Any HTTP status is `Ok`.
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

impl<T: HttpTransport> HttpTransport for Arc<T> {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send {
        (**self).send(request)
    }
}
