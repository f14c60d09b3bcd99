//! Gupshup Partner HTTP client module
//!
//! This module contains the HTTP plumbing, the authenticated request
//! dispatcher and the [`GupshupPartner`] entry point.

pub(crate) mod http_client;
pub use http_client::{HttpClient, HttpClientBuilder, Transport};

pub(crate) mod dispatcher;
pub use dispatcher::RequestDispatcher;

mod gupshup_partner;
pub use gupshup_partner::GupshupPartner;

mod builder;
pub use builder::GupshupPartnerBuilder;
