//! Basic usage example for gupshup-partner-sdk
//!
//! Run with: cargo run --example basic_usage

use gupshup_partner_sdk::GupshupPartner;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let partner = GupshupPartner::builder()
        .email("partner@example.com")
        .password("your_password_here")
        .build()?;

    println!("Client created successfully!");
    println!("Partner: {}", partner.email());

    let apps = partner.apps().list().await?;
    for app in &apps.apps {
        println!("- {} ({})", app.name, app.id);
    }

    Ok(())
}
