//! Authenticated request dispatch
//!
//! Every call is sent with the partner `Authorization` header plus whatever
//! extra headers the caller supplies (app-scoped calls add `apikey`). Failures
//! are normalized into [`GupshupError`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderValue, AUTHORIZATION};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::GupshupError;
use crate::token::PartnerAuthenticator;
use crate::types::{HttpMethod, Params, RequestSpec};

use super::http_client::{decode_json, header_map, HttpClient};

/// Builds and executes partner-authenticated HTTP calls.
#[derive(Debug)]
pub struct RequestDispatcher {
    http: HttpClient,
    authenticator: Arc<PartnerAuthenticator>,
}

impl RequestDispatcher {
    pub fn new(http: HttpClient, authenticator: Arc<PartnerAuthenticator>) -> Self {
        Self {
            http,
            authenticator,
        }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Dispatch with a textual method (`GET`, `POST`, `PUT`, `DELETE`, `PATCH`).
    ///
    /// The method is validated before any token resolution or network I/O.
    ///
    /// # Errors
    /// - [`GupshupError::InvalidArgument`] for an unknown method or malformed header
    /// - [`GupshupError::Api`] for non-2xx responses (real status) and transport failures (status 0)
    /// - [`GupshupError::Decode`] when a 2xx body is not JSON
    /// - partner login errors, unmodified
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        params: Params,
        headers: &[(&str, &str)],
    ) -> Result<Value, GupshupError> {
        let method: HttpMethod = method.parse()?;
        let spec = RequestSpec::new(method, path)
            .params(params)
            .headers(headers.iter().copied());
        self.send(spec).await
    }

    /// Dispatch a prepared [`RequestSpec`].
    ///
    /// A per-request timeout bounds the whole call, partner login included.
    pub async fn send(&self, spec: RequestSpec) -> Result<Value, GupshupError> {
        let label = format!("{} {}", spec.method, spec.path);
        let timeout = spec.timeout;
        with_deadline(timeout, &label, self.dispatch(spec)).await
    }

    async fn dispatch(&self, spec: RequestSpec) -> Result<Value, GupshupError> {
        let RequestSpec {
            method,
            path,
            params,
            headers,
            timeout,
        } = spec;

        let extra_headers = header_map(headers.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

        let token = self.authenticator.get_partner_token(false).await?;
        let authorization = HeaderValue::from_str(&token).map_err(|_| {
            GupshupError::InvalidArgument("partner token is not a valid header value".to_string())
        })?;

        let mut request_headers = http::HeaderMap::new();
        request_headers.insert(AUTHORIZATION, authorization);
        for (name, value) in extra_headers.iter() {
            request_headers.insert(name.clone(), value.clone());
        }

        let request = self
            .http
            .build_request(method, &path, &params, request_headers, timeout)?;

        debug!("[GupshupPartner] dispatching {} {}", method, path);
        let response = self.http.send(request).await.map_err(|e| {
            GupshupError::transport(format!("request {} {} failed", method, path), &e)
        })?;

        if !response.is_success() {
            return Err(GupshupError::api(
                format!("request {} {} failed with status {}", method, path, response.status),
                response.status,
                response.body,
            ));
        }

        decode_json(&response.body)
    }

    /// Dispatch and deserialize the JSON body into `T`.
    pub async fn send_as<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, GupshupError> {
        let value = self.send(spec).await?;
        serde_json::from_value(value.clone()).map_err(|e| GupshupError::Decode {
            message: e.to_string(),
            response_body: value.to_string(),
        })
    }

    pub async fn get(
        &self,
        path: &str,
        params: Params,
        headers: &[(&str, &str)],
    ) -> Result<Value, GupshupError> {
        self.verb(HttpMethod::Get, path, params, headers).await
    }

    pub async fn post(
        &self,
        path: &str,
        params: Params,
        headers: &[(&str, &str)],
    ) -> Result<Value, GupshupError> {
        self.verb(HttpMethod::Post, path, params, headers).await
    }

    pub async fn put(
        &self,
        path: &str,
        params: Params,
        headers: &[(&str, &str)],
    ) -> Result<Value, GupshupError> {
        self.verb(HttpMethod::Put, path, params, headers).await
    }

    pub async fn delete(
        &self,
        path: &str,
        params: Params,
        headers: &[(&str, &str)],
    ) -> Result<Value, GupshupError> {
        self.verb(HttpMethod::Delete, path, params, headers).await
    }

    pub async fn patch(
        &self,
        path: &str,
        params: Params,
        headers: &[(&str, &str)],
    ) -> Result<Value, GupshupError> {
        self.verb(HttpMethod::Patch, path, params, headers).await
    }

    async fn verb(
        &self,
        method: HttpMethod,
        path: &str,
        params: Params,
        headers: &[(&str, &str)],
    ) -> Result<Value, GupshupError> {
        let spec = RequestSpec::new(method, path)
            .params(params)
            .headers(headers.iter().copied());
        self.send(spec).await
    }
}

/// Runs `call` under `timeout` when one is set. Expiry is a status 0 API error.
pub(crate) async fn with_deadline<F, T>(
    timeout: Option<Duration>,
    label: &str,
    call: F,
) -> Result<T, GupshupError>
where
    F: Future<Output = Result<T, GupshupError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
            Err(GupshupError::api(
                format!("request {} timed out after {:?}", label, limit),
                0,
                String::new(),
            ))
        }),
        None => call.await,
    }
}
