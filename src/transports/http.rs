//! HTTP transport implementation using `reqwest`.
//!
//! This module provides [`ReqwestTransport`], a [`Transport`] implementation
//! that performs each request with a `reqwest` client. Both `http://` and
//! `https://` URLs are supported; TLS uses rustls.
//!
//! # Feature gate
//!
//! This module is only available when the `transport-reqwest` feature is enabled
//! (it is enabled by default).

use std::time::Duration;

use async_trait::async_trait;

use crate::error::VprikolError;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`Transport`] implementation backed by `reqwest`.
///
/// Idle connections are not pooled, so every call opens its own connection
/// and releases it once the response body has been read (or the call's future
/// is dropped).
///
/// For custom TLS, proxies or pooling, build a `reqwest::Client` yourself and
/// use [`ReqwestTransport::from_client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the default 30 second timeout.
    ///
    /// # Errors
    ///
    /// Returns [`VprikolError::Transport`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, VprikolError> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport whose requests fail with [`VprikolError::Timeout`]
    /// after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`VprikolError::Transport`] if the TLS backend cannot be initialised.
    pub fn with_timeout(timeout: Duration) -> Result<Self, VprikolError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| VprikolError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an already-configured `reqwest` client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> VprikolError {
    if e.is_timeout() {
        VprikolError::Timeout
    } else {
        VprikolError::Transport(e.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, VprikolError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };
        let mut builder = self
            .client
            .request(method, request.url.as_str())
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        tracing::debug!(
            url = %request.url,
            status,
            bytes = body.len(),
            "HTTP exchange complete"
        );

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
#[cfg(feature = "transport-reqwest")]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn reqwest_transport_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestTransport>();
    }

    // ── Mock-server helpers ──────────────────────────────────────────────

    /// Accept one connection, capture the request head, reply with `status`
    /// and `body`. Returns the base URL and a handle yielding the request head.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }
            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&head).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    // ── Mock-server tests ────────────────────────────────────────────────

    #[tokio::test]
    async fn get_sends_query_and_headers() {
        let (base, server) = serve_once("200 OK", r#"{"ok":true}"#).await;
        let transport = ReqwestTransport::new().unwrap();

        let request = HttpRequest::new(HttpMethod::Get, format!("{base}/find/getTaskResult"))
            .with_query("request_id", "abc 1")
            .with_header("Authorization", "Bearer token");
        let response = transport.execute(request).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, br#"{"ok":true}"#);
        assert!(response
            .headers
            .iter()
            .any(|(k, v)| k == "content-type" && v == "application/json"));

        let head = server.await.unwrap();
        assert!(
            head.starts_with("GET /find/getTaskResult?request_id=abc+1 HTTP/1.1"),
            "unexpected request line: {head}"
        );
        assert!(head.to_ascii_lowercase().contains("authorization: bearer token"));
    }

    #[tokio::test]
    async fn post_uses_post_method() {
        let (base, server) = serve_once("200 OK", "{}").await;
        let transport = ReqwestTransport::new().unwrap();

        let request = HttpRequest::new(HttpMethod::Post, format!("{base}/find/createTask"))
            .with_query("server", 5)
            .with_query("nick", "Nick_Name");
        transport.execute(request).await.unwrap();

        let head = server.await.unwrap();
        assert!(head.starts_with("POST /find/createTask?server=5&nick=Nick_Name HTTP/1.1"));
    }

    #[tokio::test]
    async fn error_status_is_returned_not_raised() {
        let (base, _server) =
            serve_once("425 Too Early", r#"{"error_code":425,"detail":"queued"}"#).await;
        let transport = ReqwestTransport::new().unwrap();

        let response = transport
            .execute(HttpRequest::new(HttpMethod::Get, base))
            .await
            .unwrap();
        assert_eq!(response.status, 425);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let transport = ReqwestTransport::new().unwrap();
        let err = transport
            .execute(HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:1/"))
            .await
            .unwrap_err();
        assert!(matches!(err, VprikolError::Transport(_)));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
        });

        let transport = ReqwestTransport::with_timeout(Duration::from_millis(50)).unwrap();
        let err = transport
            .execute(HttpRequest::new(HttpMethod::Get, format!("http://{addr}/")))
            .await
            .unwrap_err();
        assert!(matches!(err, VprikolError::Timeout));
    }
}
