//! Build a client from GUPSHUP_* environment variables
//!
//! Run with:
//! GUPSHUP_PARTNER_EMAIL=... GUPSHUP_PARTNER_PASSWORD=... GUPSHUP_DEFAULT_APP_ID=... \
//!     cargo run --example from_env

use gupshup_partner_sdk::api::DateRange;
use gupshup_partner_sdk::{Config, GupshupPartner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let partner = GupshupPartner::from_config(&config)?;

    let Some(app_id) = partner.default_app_id().map(str::to_string) else {
        println!("Set GUPSHUP_DEFAULT_APP_ID to fetch analytics");
        return Ok(());
    };

    let range = DateRange::parse("2024-05-01", "2024-05-31")?;
    let metrics = partner.analytics().summary_metrics(&app_id, &range).await?;
    println!(
        "sent={} delivered={:.1}% read={:.1}%",
        metrics.total_sent, metrics.delivery_rate, metrics.read_rate
    );

    Ok(())
}
