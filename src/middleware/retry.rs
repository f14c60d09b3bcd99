//! Retry middleware for transient HTTP failures.
//!
//! Retries requests that are likely to succeed on a later attempt:
//!
//! - connect and timeout errors from the transport
//! - HTTP 429 and 5xx responses
//!
//! # Non-Idempotent Requests
//!
//! POST, PUT and PATCH are sent once unless `with_retry_post(true)` is set.
//! Requests whose body cannot be cloned are always sent once.

use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::task::{Context, Poll};

use log::warn;
use reqwest::{Request, Response, StatusCode};
use tokio::time::sleep;
use tower::{Layer, Service};

use crate::utils::jittered_delay;

/// Middleware that retries requests on transport errors, 429 and 5xx.
#[derive(Debug, Clone)]
pub struct RetryMiddleware {
    max_retries: usize,
    delay_ms: u64,
    retry_post: bool,
}

impl RetryMiddleware {
    /// Create a new RetryMiddleware with default settings.
    ///
    /// Default: max_retries = 3, delay_ms = 100ms, retry_post = false
    pub fn new() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 100,
            retry_post: false,
        }
    }

    /// Retries after the first attempt. Zero sends every request exactly once.
    pub fn with_max_retries(mut self, max: usize) -> Self {
        self.max_retries = max;
        self
    }

    /// Base delay between retries in milliseconds, doubled per attempt.
    pub fn with_delay_ms(mut self, delay: u64) -> Self {
        self.delay_ms = delay;
        self
    }

    /// Enable retrying POST/PUT/PATCH requests (disabled by default).
    pub fn with_retry_post(mut self, retry: bool) -> Self {
        self.retry_post = retry;
        self
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Transport failures worth another attempt.
    pub fn is_retryable_error(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect()
    }

    pub fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }
}

impl Default for RetryMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for RetryMiddleware {
    type Service = RetryMiddlewareService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RetryMiddlewareService {
            inner,
            max_retries: self.max_retries,
            delay_ms: self.delay_ms,
            retry_post: self.retry_post,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryMiddlewareService<S> {
    inner: S,
    pub(crate) max_retries: usize,
    pub(crate) delay_ms: u64,
    pub(crate) retry_post: bool,
}

/// Whether a request may be safely replayed.
pub trait RetryableRequest: Sized {
    /// GET and DELETE are idempotent; POST, PUT and PATCH are not.
    fn is_idempotent(&self) -> bool;

    /// A copy for the next attempt, or `None` when the body is a one-shot stream.
    fn try_clone_request(&self) -> Option<Self>;
}

impl RetryableRequest for Request {
    fn is_idempotent(&self) -> bool {
        !matches!(
            self.method(),
            &reqwest::Method::POST | &reqwest::Method::PUT | &reqwest::Method::PATCH
        )
    }

    fn try_clone_request(&self) -> Option<Self> {
        self.try_clone()
    }
}

impl<S> Service<Request> for RetryMiddlewareService<S>
where
    S: Service<Request, Response = Response, Error = reqwest::Error> + Send + Clone + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = reqwest::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        // Keep the service that was driven to readiness for the first attempt.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let max_retries = self.max_retries;
        let delay_ms = self.delay_ms;
        let retry_post = self.retry_post;

        Box::pin(async move {
            if max_retries == 0 || (!req.is_idempotent() && !retry_post) {
                return inner.call(req).await;
            }

            let mut attempt: u32 = 0;
            let mut current = req;
            loop {
                let method = current.method().clone();
                let url = current.url().path().to_string();
                let next = current.try_clone_request();

                let outcome = inner.call(current).await;
                let retryable = match &outcome {
                    Ok(response) => RetryMiddleware::is_retryable_status(response.status()),
                    Err(error) => RetryMiddleware::is_retryable_error(error),
                };

                let next = match next {
                    Some(next) if retryable && (attempt as usize) < max_retries => next,
                    _ => return outcome,
                };

                let delay = jittered_delay(delay_ms, attempt);
                match &outcome {
                    Ok(response) => warn!(
                        "[GupshupPartner] {} {} returned {}, retrying in {:?} ({}/{})",
                        method,
                        url,
                        response.status().as_u16(),
                        delay,
                        attempt + 1,
                        max_retries
                    ),
                    Err(error) => warn!(
                        "[GupshupPartner] {} {} failed: {}, retrying in {:?} ({}/{})",
                        method,
                        url,
                        error,
                        delay,
                        attempt + 1,
                        max_retries
                    ),
                }
                drop(outcome);

                sleep(delay).await;
                attempt += 1;
                current = next;
                poll_fn(|cx| inner.poll_ready(cx)).await?;
            }
        })
    }
}
