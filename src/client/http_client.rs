//! Gupshup HTTP Client
//!
//! Low-level HTTP plumbing shared by the partner authenticator and the request
//! dispatcher: request construction (query vs. form encoding, headers,
//! deadlines), the middleware-aware transport, and JSON body decoding.

use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use tower::Service;

use crate::error::GupshupError;
use crate::types::{HttpMethod, Params};

pub(crate) const DEFAULT_BASE_URL: &str = "https://partner.gupshup.io";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

type TransportFuture =
    Pin<Box<dyn Future<Output = Result<reqwest::Response, reqwest::Error>> + Send>>;
type TransportFn = Arc<dyn Fn(reqwest::Request) -> TransportFuture + Send + Sync>;

/// Type-erased request executor.
///
/// Wraps either the bare [`reqwest::Client`] or a middleware stack layered on
/// top of it. Middleware registered through
/// [`GupshupPartnerBuilder::with_middleware`](crate::GupshupPartnerBuilder::with_middleware)
/// receives a `Transport` as its inner service.
#[derive(Clone)]
pub struct Transport {
    call: TransportFn,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport").finish_non_exhaustive()
    }
}

impl Transport {
    pub(crate) fn direct(http: Client) -> Self {
        Self {
            call: Arc::new(move |request: reqwest::Request| {
                let http = http.clone();
                Box::pin(async move { http.execute(request).await })
            }),
        }
    }

    pub(crate) fn from_service<S>(service: S) -> Self
    where
        S: Service<reqwest::Request, Response = reqwest::Response, Error = reqwest::Error>
            + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        Self {
            call: Arc::new(move |request: reqwest::Request| {
                let mut service = service.clone();
                Box::pin(async move {
                    poll_fn(|cx| service.poll_ready(cx)).await?;
                    service.call(request).await
                })
            }),
        }
    }
}

impl Service<reqwest::Request> for Transport {
    type Response = reqwest::Response;
    type Error = reqwest::Error;
    type Future = TransportFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: reqwest::Request) -> Self::Future {
        (self.call)(req)
    }
}

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

impl RawResponse {
    pub(crate) fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Gupshup Partner API HTTP client
///
/// Knows nothing about tokens: callers pass every header explicitly.
#[derive(Clone)]
pub struct HttpClient {
    http: Client,
    base_url: String,
    transport: Transport,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new client builder
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// A transport executing requests directly on the underlying client.
    pub(crate) fn direct_transport(&self) -> Transport {
        Transport::direct(self.http.clone())
    }

    /// Builds a request for `path` relative to the base URL.
    ///
    /// GET/DELETE params go to the query string, POST/PUT/PATCH params to a
    /// form-encoded body.
    pub(crate) fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        params: &Params,
        headers: HeaderMap,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Request, GupshupError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method.to_http(), url).headers(headers);

        if !params.is_empty() {
            builder = if method.sends_form_body() {
                builder.form(params.as_pairs())
            } else {
                builder.query(params.as_pairs())
            };
        }

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        builder.build().map_err(|e| {
            GupshupError::InvalidArgument(format!("cannot build {} {}: {}", method, path, e))
        })
    }

    /// Sends through the middleware-aware transport and reads the whole body.
    pub(crate) async fn send(
        &self,
        request: reqwest::Request,
    ) -> Result<RawResponse, reqwest::Error> {
        let mut transport = self.transport.clone();
        let response = transport.call(request).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

/// Validates caller-supplied header pairs.
///
/// Later pairs replace earlier ones with the same (case-insensitive) name.
pub(crate) fn header_map<'a, I>(headers: I) -> Result<HeaderMap, GupshupError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| GupshupError::InvalidArgument(format!("invalid header name: {}", name)))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            GupshupError::InvalidArgument(format!("invalid value for header {}", name))
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Decodes a successful response body. An empty body decodes to `Value::Null`.
pub(crate) fn decode_json(body: &str) -> Result<Value, GupshupError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| GupshupError::Decode {
        message: e.to_string(),
        response_body: body.to_string(),
    })
}

/// Builder for HttpClient
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl HttpClientBuilder {
    /// Set the base URL for API calls
    ///
    /// Default: `<https://partner.gupshup.io>`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the total timeout for requests
    ///
    /// Default: 30 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    ///
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the HttpClient
    ///
    /// # Errors
    /// Returns an error if the base URL is not http(s) or the TLS backend fails to initialize
    pub fn build(self) -> Result<HttpClient, GupshupError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(GupshupError::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let connect_timeout = self
            .connect_timeout
            .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| GupshupError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpClient {
            transport: Transport::direct(http.clone()),
            http,
            base_url,
        })
    }
}
