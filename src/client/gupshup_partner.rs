//! Unified Gupshup Partner API client

use std::sync::Arc;

use serde_json::Value;

use crate::api::analytics::AnalyticsApi;
use crate::api::apps::AppsApi;
use crate::api::flows::FlowsApi;
use crate::api::messages::MessagesApi;
use crate::api::templates::TemplatesApi;
use crate::api::wallet::WalletApi;
use crate::api::PartnerContext;
use crate::config::Config;
use crate::error::GupshupError;
use crate::types::{Params, RequestSpec};

use super::builder::GupshupPartnerBuilder;

/// Unified Gupshup Partner client
///
/// Main entry point of the SDK. Owns the token flows and the request
/// dispatcher, and hands out the domain API modules.
///
/// # Example
///
/// ```no_run
/// use gupshup_partner_sdk::GupshupPartner;
/// use gupshup_partner_sdk::types::Params;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let partner = GupshupPartner::builder()
///         .email("partner@example.com")
///         .password("secret")
///         .build()?;
///
///     let apps = partner.apps().list().await?;
///     println!("{} apps linked", apps.apps.len());
///
///     let templates = partner
///         .execute("GET", "/partner/app/template/list", Params::new().with("appId", "app-1"), &[])
///         .await?;
///     println!("{}", templates);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct GupshupPartner {
    context: Arc<PartnerContext>,
    default_app_id: Option<String>,
    default_app_name: Option<String>,
}

impl std::fmt::Debug for GupshupPartner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GupshupPartner")
            .field("email", &self.email())
            .field("default_app_id", &self.default_app_id)
            .finish_non_exhaustive()
    }
}

impl GupshupPartner {
    pub(crate) fn new(
        context: Arc<PartnerContext>,
        default_app_id: Option<String>,
        default_app_name: Option<String>,
    ) -> Self {
        Self {
            context,
            default_app_id,
            default_app_name,
        }
    }

    pub fn builder() -> GupshupPartnerBuilder {
        GupshupPartnerBuilder::default()
    }

    /// Build a client from loaded configuration.
    ///
    /// ```no_run
    /// use gupshup_partner_sdk::{config::Config, GupshupPartner};
    ///
    /// # fn main() -> Result<(), gupshup_partner_sdk::GupshupError> {
    /// let partner = GupshupPartner::from_config(&Config::from_env()?)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_config(config: &Config) -> Result<Self, GupshupError> {
        Self::builder().from_config(config).build()
    }

    pub fn email(&self) -> &str {
        self.context.authenticator().credentials().email().as_str()
    }

    pub fn default_app_id(&self) -> Option<&str> {
        self.default_app_id.as_deref()
    }

    pub fn default_app_name(&self) -> Option<&str> {
        self.default_app_name.as_deref()
    }

    pub fn context(&self) -> &Arc<PartnerContext> {
        &self.context
    }

    // Tokens

    /// Partner token, from cache unless `force_refresh` is set.
    pub async fn resolve_partner_token(&self, force_refresh: bool) -> Result<String, GupshupError> {
        self.context.resolve_partner_token(force_refresh).await
    }

    /// App token for `app_id`, from cache unless `force_refresh` is set.
    pub async fn resolve_app_token(
        &self,
        app_id: &str,
        force_refresh: bool,
    ) -> Result<String, GupshupError> {
        self.context.resolve_app_token(app_id, force_refresh).await
    }

    /// App token for the configured default app.
    ///
    /// # Errors
    /// Returns [`GupshupError::Config`] when no default app id is configured.
    pub async fn resolve_default_app_token(
        &self,
        force_refresh: bool,
    ) -> Result<String, GupshupError> {
        let app_id = self
            .default_app_id
            .as_deref()
            .ok_or_else(|| GupshupError::Config("no default app id configured".to_string()))?;
        self.resolve_app_token(app_id, force_refresh).await
    }

    pub async fn invalidate_partner_token(&self) {
        self.context.authenticator().invalidate().await;
    }

    pub async fn invalidate_app_token(&self, app_id: &str) {
        self.context.app_tokens().invalidate(app_id).await;
    }

    // Requests

    /// Authenticated call with a textual HTTP method.
    pub async fn execute(
        &self,
        method: &str,
        path: &str,
        params: Params,
        headers: &[(&str, &str)],
    ) -> Result<Value, GupshupError> {
        self.context.execute(method, path, params, headers).await
    }

    pub async fn send(&self, spec: RequestSpec) -> Result<Value, GupshupError> {
        self.context.dispatcher().send(spec).await
    }

    pub async fn get(&self, path: &str, params: Params) -> Result<Value, GupshupError> {
        self.context.dispatcher().get(path, params, &[]).await
    }

    pub async fn post(&self, path: &str, params: Params) -> Result<Value, GupshupError> {
        self.context.dispatcher().post(path, params, &[]).await
    }

    pub async fn put(&self, path: &str, params: Params) -> Result<Value, GupshupError> {
        self.context.dispatcher().put(path, params, &[]).await
    }

    pub async fn delete(&self, path: &str, params: Params) -> Result<Value, GupshupError> {
        self.context.dispatcher().delete(path, params, &[]).await
    }

    pub async fn patch(&self, path: &str, params: Params) -> Result<Value, GupshupError> {
        self.context.dispatcher().patch(path, params, &[]).await
    }

    // Domain APIs

    pub fn apps(&self) -> AppsApi {
        AppsApi::new(self.context.clone())
    }

    pub fn templates(&self) -> TemplatesApi {
        TemplatesApi::new(self.context.clone())
    }

    pub fn messages(&self) -> MessagesApi {
        MessagesApi::new(self.context.clone())
    }

    pub fn analytics(&self) -> AnalyticsApi {
        AnalyticsApi::new(self.context.clone())
    }

    pub fn wallet(&self) -> WalletApi {
        WalletApi::new(self.context.clone())
    }

    pub fn flows(&self) -> FlowsApi {
        FlowsApi::new(self.context.clone())
    }
}
