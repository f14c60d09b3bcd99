//! Partner API trait and context
//!
//! Provides the shared context every domain module is built on.

use std::sync::Arc;

use serde_json::Value;

use crate::client::dispatcher::with_deadline;
use crate::client::RequestDispatcher;
use crate::error::GupshupError;
use crate::token::{AppTokenResolver, PartnerAuthenticator};
use crate::types::{Params, RequestSpec};

/// Context holding shared resources for the domain API modules.
///
/// Exposes the three operations domain modules are written against:
/// [`resolve_partner_token`](Self::resolve_partner_token),
/// [`resolve_app_token`](Self::resolve_app_token) and [`execute`](Self::execute).
#[derive(Clone)]
pub struct PartnerContext {
    pub(crate) authenticator: Arc<PartnerAuthenticator>,
    pub(crate) app_tokens: Arc<AppTokenResolver>,
    pub(crate) dispatcher: Arc<RequestDispatcher>,
}

impl std::fmt::Debug for PartnerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerContext")
            .field("authenticator", &"PartnerAuthenticator { .. }")
            .field("app_tokens", &"AppTokenResolver { .. }")
            .field("dispatcher", &"RequestDispatcher { .. }")
            .finish()
    }
}

impl PartnerContext {
    pub fn new(
        authenticator: Arc<PartnerAuthenticator>,
        app_tokens: Arc<AppTokenResolver>,
        dispatcher: Arc<RequestDispatcher>,
    ) -> Self {
        Self {
            authenticator,
            app_tokens,
            dispatcher,
        }
    }

    pub fn authenticator(&self) -> &PartnerAuthenticator {
        &self.authenticator
    }

    pub fn app_tokens(&self) -> &AppTokenResolver {
        &self.app_tokens
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    pub async fn resolve_partner_token(&self, force_refresh: bool) -> Result<String, GupshupError> {
        self.authenticator.get_partner_token(force_refresh).await
    }

    pub async fn resolve_app_token(
        &self,
        app_id: &str,
        force_refresh: bool,
    ) -> Result<String, GupshupError> {
        self.app_tokens.get_app_token(app_id, force_refresh).await
    }

    pub async fn execute(
        &self,
        method: &str,
        path: &str,
        params: Params,
        headers: &[(&str, &str)],
    ) -> Result<Value, GupshupError> {
        self.dispatcher.request(method, path, params, headers).await
    }

    /// Sends `spec` as an app-scoped call: resolves the app token and attaches it as `apikey`.
    ///
    /// A per-request timeout also covers the app token fetch.
    pub(crate) async fn app_call(
        &self,
        app_id: &str,
        spec: RequestSpec,
    ) -> Result<Value, GupshupError> {
        let label = format!("{} {}", spec.method, spec.path);
        let timeout = spec.timeout;
        with_deadline(timeout, &label, async move {
            let token = self.resolve_app_token(app_id, false).await?;
            self.dispatcher.send(spec.api_key(token)).await
        })
        .await
    }

    /// Sends `spec` with the partner token only.
    pub(crate) async fn partner_call(&self, spec: RequestSpec) -> Result<Value, GupshupError> {
        self.dispatcher.send(spec).await
    }
}

/// Trait for domain API implementations.
pub trait PartnerApi: Send + Sync {
    /// Get a reference to the partner context
    fn context(&self) -> &PartnerContext;
}
