//! Middleware components for the partner HTTP transport.
//!
//! Middleware is built on Tower `Layer`/`Service` over `reqwest::Request` and
//! `reqwest::Response`, and is wired into the client through
//! [`GupshupPartnerBuilder::with_middleware`](crate::GupshupPartnerBuilder::with_middleware).
//!
//! ## Middleware Types
//!
//! - [`RetryMiddleware`] - Retries transport errors, 429 and 5xx responses
//! - [`LoggingMiddleware`] - Logs request/response information with redaction
//!
//! ## Usage
//!
//! ```no_run
//! use gupshup_partner_sdk::middleware::{LoggingMiddleware, RetryMiddleware};
//! use gupshup_partner_sdk::GupshupPartner;
//!
//! # fn main() -> Result<(), gupshup_partner_sdk::GupshupError> {
//! let partner = GupshupPartner::builder()
//!     .email("partner@example.com")
//!     .password("secret")
//!     .with_middleware(RetryMiddleware::new().with_max_retries(2))
//!     .with_middleware(LoggingMiddleware::new())
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// Re-export tower types for convenience
pub use tower::{Layer, Service, ServiceBuilder};

mod logging;
mod retry;

pub use logging::{LoggingMiddleware, LoggingMiddlewareService};
pub use retry::{RetryMiddleware, RetryMiddlewareService, RetryableRequest};
