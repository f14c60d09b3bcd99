//! Gupshup Partner API modules
//!
//! Each submodule wraps one area of the Partner API:
//!
//! - [`apps`] - App listing, linking, tokens and app profile settings
//! - [`templates`] - Template creation, editing and status filters
//! - [`messages`] - Template, carousel, product and CTA messages
//! - [`analytics`] - Message logs, usage and delivery statistics
//! - [`wallet`] - Partner wallet balance, statements and overdraft
//! - [`flows`] - WhatsApp Flows lifecycle and subscriptions
//!
//! App-scoped calls resolve the app token first and send it as `apikey`
//! alongside the partner `Authorization` header.
//!
//! ## Usage
//!
//! ```no_run
//! # async fn run(partner: gupshup_partner_sdk::GupshupPartner) -> Result<(), gupshup_partner_sdk::GupshupError> {
//! let approved = partner.templates().approved("app-1").await?;
//! let balance = partner.wallet().balance("wallet-1").await?;
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod apps;
pub mod flows;
pub mod messages;
pub mod templates;
pub mod r#trait;
pub mod wallet;

pub use analytics::{AnalyticsApi, AnalyticsReport, DateRange, SummaryMetrics, TodayReport};
pub use apps::{AppsApi, PartnerApp, PartnerAppList};
pub use flows::FlowsApi;
pub use messages::{MessagesApi, TemplateMedia, TemplateMessage, ValidityCategory};
pub use r#trait::{PartnerApi, PartnerContext};
pub use templates::{TemplateKind, TemplatesApi};
pub use wallet::WalletApi;
