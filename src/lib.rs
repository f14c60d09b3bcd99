//! Gupshup Partner API SDK for Rust
//!
//! An async client for the Gupshup Partner API (WhatsApp Business). It owns
//! the two token flows every call depends on and exposes the partner
//! endpoints through typed modules.
//!
//! ## Token Flows
//!
//! | Token | Obtained from | Sent as | Cached for |
//! |-------|---------------|---------|------------|
//! | Partner token | `POST /partner/account/login` | `Authorization` | configured expiry - 1h |
//! | App token | `GET /partner/app/{appId}/token/` | `apikey` | 23h |
//!
//! Tokens live in an injected [`TokenCache`](cache::TokenCache), so several
//! processes can share one store. Concurrent refreshes of the same token are
//! collapsed into a single network call.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gupshup_partner_sdk::GupshupPartner;
//! use gupshup_partner_sdk::api::TemplateMessage;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let partner = GupshupPartner::builder()
//!         .email("partner@example.com")
//!         .password("your_password")
//!         .build()?;
//!
//!     for app in partner.apps().list().await?.apps {
//!         println!("{} ({})", app.name, app.id);
//!     }
//!
//!     let message = TemplateMessage::new("5511999999999", "order_update").params(["#1234"]);
//!     partner.messages().send_template("app-1", &message).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Partner API modules (apps, templates, messages, analytics, wallet, flows)
//! - [`cache`] - Token cache capability and the in-memory implementation
//! - [`client`] - HTTP client, request dispatcher and the [`GupshupPartner`] entry point
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Error types
//! - [`middleware`] - Tower retry and logging layers
//! - [`token`] - Partner and app token management (for advanced users)
//! - [`types`] - Request and credential types
//!
//! ## Error Handling
//!
//! The SDK uses the [`GupshupError`] enum for error handling:
//!
//! ```no_run
//! use gupshup_partner_sdk::{GupshupError, GupshupPartner};
//!
//! # async fn run(partner: GupshupPartner) {
//! match partner.resolve_app_token("app-1", false).await {
//!     Ok(token) => println!("token: {} chars", token.len()),
//!     Err(GupshupError::TokenNotFound { app_id }) => {
//!         eprintln!("no token issued for {}", app_id);
//!     }
//!     Err(e) if e.is_transient() => {
//!         eprintln!("temporary failure, try again: {}", e);
//!     }
//!     Err(e) => {
//!         eprintln!("Other error: {}", e);
//!     }
//! }
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod token;
pub mod types;
mod utils;

pub use cache::{MemoryTokenCache, NoopTokenCache, TokenCache};
pub use client::{GupshupPartner, GupshupPartnerBuilder};
pub use config::Config;
pub use error::GupshupError;
