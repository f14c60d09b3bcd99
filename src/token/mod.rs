//! Token lifecycle for the Gupshup Partner API
//!
//! Two kinds of bearer token are involved:
//!
//! - the **partner token**, obtained by credential login and sent as the
//!   `Authorization` header on every call ([`PartnerAuthenticator`]);
//! - the **app token**, one per app id, obtained from the app token endpoint
//!   with a partner token and sent as the `apikey` header on app-scoped calls
//!   ([`AppTokenResolver`]).
//!
//! Both are stored in the injected [`TokenCache`](crate::cache::TokenCache).

use std::time::Duration;

use tokio::time::Instant;

use crate::utils::sha256_hex;

mod app;
mod partner;

pub use app::{AppToken, AppTokenResolver, APP_TOKEN_TTL};
pub use partner::{PartnerAuthenticator, PartnerToken};

pub const DEFAULT_CACHE_PREFIX: &str = "gupshup_";
pub const DEFAULT_TOKEN_EXPIRY_HOURS: u64 = 24;

/// Cache key of the partner token for `email`. The e-mail itself is hashed.
pub fn partner_token_key(prefix: &str, email: &str) -> String {
    format!("{}partner_token:{}", prefix, sha256_hex(email))
}

/// Cache key of the app token for `app_id`.
pub fn app_token_key(prefix: &str, app_id: &str) -> String {
    format!("{}app_token:{}", prefix, app_id)
}

/// Partner token TTL: one hour below the configured provider lifetime.
pub fn partner_token_ttl(token_expiry_hours: u64) -> Duration {
    Duration::from_secs(token_expiry_hours.saturating_sub(1) * 60 * 60)
}

fn is_expired(obtained_at: Instant, ttl: Duration) -> bool {
    Instant::now() >= obtained_at + ttl
}
