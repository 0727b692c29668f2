//! HTTP transport implementation using `reqwest`.

use reqwest::header::CONTENT_TYPE;

use crate::{ApiRequest, ApiResponse, Body, HttpTransport, Method, TransportError};

/// A `reqwest`-based [`HttpTransport`] bound to one API host.
///
/// Cloning is cheap: `reqwest::Client` keeps its connection pool behind an
/// `Arc`, so the session manager and every store can hold their own clone.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a transport for the API at `base_url` with a default client.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidUrl`] if `base_url` is not an
    /// absolute URL.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a transport that uses a preconfigured `reqwest::Client`.
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
    ) -> Result<Self, TransportError> {
        reqwest::Url::parse(base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL (without trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` onto the base URL. A base path prefix such as
    /// `https://host/backend` is kept.
    fn url_for(&self, path: &str) -> Result<reqwest::Url, TransportError> {
        let joined = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        reqwest::Url::parse(&joined)
            .map_err(|e| TransportError::InvalidUrl(format!("{joined}: {e}")))
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request.path)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            Body::Empty => builder,
            Body::Json(bytes) => {
                builder.header(CONTENT_TYPE, "application/json").body(bytes)
            }
            Body::Form(fields) => builder.form(&fields),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                error = %e,
                "request failed"
            );
            TransportError::RequestFailed(e)
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(TransportError::ReadFailed)?
            .to_vec();

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status,
            "request completed"
        );

        Ok(ApiResponse { status, body })
    }
}
