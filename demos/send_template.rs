//! Send a template message with an image header
//!
//! Run with: cargo run --example send_template

use gupshup_partner_sdk::api::TemplateMessage;
use gupshup_partner_sdk::GupshupPartner;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let partner = GupshupPartner::builder()
        .email("partner@example.com")
        .password("your_password_here")
        .build()?;

    let app_id = "your-app-id";

    let approved = partner.templates().approved(app_id).await?;
    println!("{} approved templates", approved.len());

    let message = TemplateMessage::new("5511999999999", "order_update")
        .params(["#1234", "shipped"])
        .image_url("https://cdn.example.com/box.png");

    let response = partner.messages().send_template(app_id, &message).await?;
    println!("Sent: {}", response);

    Ok(())
}
