//! Partner login and app token resolution
//!
//! Run with: cargo run --example app_token_flow

use std::sync::Arc;

use gupshup_partner_sdk::{GupshupError, GupshupPartner, MemoryTokenCache};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Share one cache between clients to reuse tokens.
    let cache = Arc::new(MemoryTokenCache::new());

    let partner = GupshupPartner::builder()
        .email("partner@example.com")
        .password("your_password_here")
        .cache(cache.clone())
        .build()?;

    let partner_token = partner.resolve_partner_token(false).await?;
    println!("Partner token: {} chars", partner_token.len());

    match partner.resolve_app_token("your-app-id", false).await {
        Ok(token) => println!("App token: {} chars", token.len()),
        Err(GupshupError::TokenNotFound { app_id }) => {
            println!("No token issued yet for {}", app_id);
        }
        Err(e) => return Err(e.into()),
    }

    println!("Cached tokens: {}", cache.len().await);

    // Force a fresh login, e.g. after the token was revoked.
    partner.resolve_partner_token(true).await?;

    Ok(())
}
