//! HTTP transport seam shared by the provider clients
//!
//! Providers only need "GET this path with these query parameters and give
//! me the status and body". Keeping that behind the [`Transport`] trait lets
//! the caching and validation logic run against a scripted fake in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Url};

use super::FetchError;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Status code and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Passes the response through if it is a 2xx, otherwise fails with its status
    pub fn expect_success(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::UnexpectedStatus {
                expected: "2xx",
                actual: self.status,
            })
        }
    }
}

/// Issues GET requests relative to a provider's base URL
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a GET for `path` (relative to the base URL) with `query` appended
    ///
    /// Only failures to obtain a response at all are errors here; any status
    /// code is returned as a [`RawResponse`] for the caller to judge.
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<RawResponse, FetchError>;
}

/// [`Transport`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Creates a transport sending requests through `client` to paths under `base_url`
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// A client builder with the settings shared by all providers
    pub fn client_builder(timeout: Duration) -> ClientBuilder {
        Client::builder().user_agent(USER_AGENT).timeout(timeout)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<RawResponse, FetchError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::Transport(Box::new(e)))?;

        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}


/// One-shot HTTP server on a local port, for driving [`HttpTransport`] end to end
#[cfg(test)]
pub(crate) mod local {
    use reqwest::Url;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Builds a complete HTTP/1.1 response; each extra header line must end in `\r\n`
    pub fn response(status: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n{extra_headers}\r\n{body}",
            body.len()
        )
    }

    /// Answers the first connection with `response`
    ///
    /// Returns the base URL to point a client at (with an `/api/` prefix)
    /// and a handle yielding the request head the server received.
    pub async fn serve_once(response: String) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = Url::parse(&format!("http://{addr}/api/")).unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&head).into_owned()
        });

        (base_url, handle)
    }

    /// A base URL on a local port nothing listens on
    pub async fn closed_base_url() -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Url::parse(&format!("http://{addr}/api/")).unwrap()
    }
}
