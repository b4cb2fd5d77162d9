//! Transport abstraction for the vprikol API.
//!
//! The [`Transport`] trait performs one body-less HTTP exchange. Requests and
//! responses are plain data ([`HttpRequest`], [`HttpResponse`]), so the
//! client, envelope decoding and job poller never touch the network directly
//! and can be driven by a scripted transport in tests.
//!
//! A `reqwest`-backed implementation is provided by
//! [`ReqwestTransport`](crate::transports::ReqwestTransport) behind the
//! default `transport-reqwest` feature.
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use vprikol_client::error::VprikolError;
//! use vprikol_client::transport::{HttpRequest, HttpResponse, Transport};
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MyTransport {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, VprikolError> {
//!         // Perform the request, return status, headers and the raw body.
//!         todo!()
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::VprikolError;

/// HTTP method for a request. The API only needs body-less GET and POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub url: String,
    /// Query parameters in the order they should be encoded.
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs HTTP exchanges on behalf of [`VprikolClient`](crate::VprikolClient).
///
/// Every call is independent: implementations must not carry per-call state
/// between requests, and any connection opened for a call should be released
/// when the returned future completes or is dropped.
///
/// A non-2xx status is **not** an error at this layer; return it as an
/// [`HttpResponse`] so the envelope can decode the structured error body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a single request.
    ///
    /// # Errors
    ///
    /// Returns [`VprikolError::Transport`] when no response was received, or
    /// [`VprikolError::Timeout`] when the transport's own deadline elapsed.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, VprikolError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, VprikolError> {
        (**self).execute(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, VprikolError> {
        (**self).execute(request).await
    }
}
