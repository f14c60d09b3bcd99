//! App Management API
//!
//! Partner-level app listing and linking, per-app token access, and app-scoped
//! profile/business settings.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PartnerApi, PartnerContext};
use crate::error::GupshupError;
use crate::types::{HttpMethod, Params, RequestSpec};
use crate::utils::encode_path_segment;

const MAX_ICE_BREAKERS: usize = 4;
const MAX_ICE_BREAKER_CHARS: usize = 80;

/// An app linked to the partner account.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PartnerApp {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Response of the partner app listing.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PartnerAppList {
    #[serde(rename = "partnerAppsList", default)]
    pub apps: Vec<PartnerApp>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

pub struct AppsApi {
    context: Arc<PartnerContext>,
}

impl AppsApi {
    pub fn new(context: Arc<PartnerContext>) -> Self {
        Self { context }
    }

    /// List every app linked to the partner account.
    pub async fn list(&self) -> Result<PartnerAppList, GupshupError> {
        self.context
            .dispatcher
            .send_as(RequestSpec::get("/partner/account/api/partnerApps"))
            .await
    }

    /// Link an existing app to the partner account.
    pub async fn link(&self, api_key: &str, app_name: &str) -> Result<Value, GupshupError> {
        let params = Params::new()
            .with("apiKey", api_key)
            .with("appName", app_name);
        self.context
            .partner_call(RequestSpec::post("/partner/account/api/appLink").params(params))
            .await
    }

    /// App token for `app_id`; see [`AppTokenResolver`](crate::token::AppTokenResolver).
    pub async fn token(&self, app_id: &str, force_refresh: bool) -> Result<String, GupshupError> {
        self.context.resolve_app_token(app_id, force_refresh).await
    }

    /// Find a single app in the partner app list.
    ///
    /// # Errors
    /// Returns [`GupshupError::AppNotFound`] when no listed app has this id.
    pub async fn get(&self, app_id: &str) -> Result<PartnerApp, GupshupError> {
        self.list()
            .await?
            .apps
            .into_iter()
            .find(|app| app.id == app_id)
            .ok_or_else(|| GupshupError::AppNotFound {
                app_id: app_id.to_string(),
            })
    }

    pub async fn toggle_template_messaging(
        &self,
        app_id: &str,
        enable: bool,
    ) -> Result<Value, GupshupError> {
        let params = Params::new()
            .with("appId", app_id)
            .with("enable", if enable { "true" } else { "false" });
        self.context
            .partner_call(RequestSpec::post("/partner/app/toggleTemplateMessaging").params(params))
            .await
    }

    /// Quality rating and messaging limits.
    pub async fn quality_and_limits(&self, app_id: &str) -> Result<Value, GupshupError> {
        self.context
            .partner_call(RequestSpec::get(app_path(app_id, "qualityRating")))
            .await
    }

    pub async fn mark_for_migration(&self, app_id: &str) -> Result<Value, GupshupError> {
        self.context
            .partner_call(RequestSpec::post(app_path(app_id, "markForMigration")))
            .await
    }

    pub async fn delete_sandbox(&self, app_id: &str) -> Result<Value, GupshupError> {
        self.context
            .partner_call(RequestSpec::new(
                HttpMethod::Delete,
                app_path(app_id, "sandbox"),
            ))
            .await
    }

    pub async fn business_details(&self, app_id: &str) -> Result<Value, GupshupError> {
        self.context
            .app_call(app_id, RequestSpec::get(app_path(app_id, "business")))
            .await
    }

    pub async fn profile(&self, app_id: &str) -> Result<Value, GupshupError> {
        self.context
            .app_call(app_id, RequestSpec::get(app_path(app_id, "profile")))
            .await
    }

    pub async fn profile_photo(&self, app_id: &str) -> Result<Value, GupshupError> {
        self.context
            .app_call(app_id, RequestSpec::get(app_path(app_id, "profile/photo")))
            .await
    }

    pub async fn delete_profile_photo(&self, app_id: &str) -> Result<Value, GupshupError> {
        self.context
            .app_call(
                app_id,
                RequestSpec::new(HttpMethod::Delete, app_path(app_id, "profile/photo")),
            )
            .await
    }

    /// Configure up to four ice breakers of at most 80 characters each.
    ///
    /// Limits are checked before any token resolution or network call.
    pub async fn set_ice_breakers<S: AsRef<str>>(
        &self,
        app_id: &str,
        ice_breakers: &[S],
    ) -> Result<Value, GupshupError> {
        validate_ice_breakers(ice_breakers)?;

        let list: Vec<&str> = ice_breakers.iter().map(AsRef::as_ref).collect();
        let params = Params::new().with_json("iceBreakers", &serde_json::json!(list));
        self.context
            .app_call(
                app_id,
                RequestSpec::post(app_path(app_id, "icebreakers")).params(params),
            )
            .await
    }

    pub async fn send_welcome_message(
        &self,
        app_id: &str,
        message: &str,
    ) -> Result<Value, GupshupError> {
        let params = Params::new().with("message", message);
        self.context
            .app_call(
                app_id,
                RequestSpec::post(app_path(app_id, "welcomeMessage")).params(params),
            )
            .await
    }
}

impl PartnerApi for AppsApi {
    fn context(&self) -> &PartnerContext {
        &self.context
    }
}

pub(crate) fn app_path(app_id: &str, suffix: &str) -> String {
    format!("/partner/app/{}/{}", encode_path_segment(app_id), suffix)
}

fn validate_ice_breakers<S: AsRef<str>>(ice_breakers: &[S]) -> Result<(), GupshupError> {
    if ice_breakers.len() > MAX_ICE_BREAKERS {
        return Err(GupshupError::InvalidArgument(format!(
            "at most {} ice breakers are allowed, got {}",
            MAX_ICE_BREAKERS,
            ice_breakers.len()
        )));
    }
    if let Some(long) = ice_breakers
        .iter()
        .map(AsRef::as_ref)
        .find(|text| text.chars().count() > MAX_ICE_BREAKER_CHARS)
    {
        return Err(GupshupError::InvalidArgument(format!(
            "ice breaker exceeds {} characters: {}",
            MAX_ICE_BREAKER_CHARS, long
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_path_encodes_id() {
        assert_eq!(app_path("app-1", "profile"), "/partner/app/app-1/profile");
        assert_eq!(
            app_path("a/b", "profile/photo"),
            "/partner/app/a%2Fb/profile/photo"
        );
    }

    #[test]
    fn test_partner_app_list_deserialize() {
        let json = serde_json::json!({
            "status": "success",
            "partnerAppsList": [
                {"id": "app-1", "name": "Shop", "live": true},
                {"id": "app-2", "name": "Support"}
            ]
        });
        let list: PartnerAppList = serde_json::from_value(json).unwrap();
        assert_eq!(list.apps.len(), 2);
        assert_eq!(list.apps[0].name, "Shop");
        assert_eq!(list.apps[0].extra["live"], true);
        assert_eq!(list.extra["status"], "success");
    }

    #[test]
    fn test_partner_app_list_missing_field_is_empty() {
        let list: PartnerAppList = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(list.apps.is_empty());
    }

    #[test]
    fn test_validate_ice_breakers() {
        assert!(validate_ice_breakers(&["Hi", "Prices?"]).is_ok());
        assert!(validate_ice_breakers::<&str>(&[]).is_ok());

        let too_many = ["a", "b", "c", "d", "e"];
        assert!(matches!(
            validate_ice_breakers(&too_many),
            Err(GupshupError::InvalidArgument(_))
        ));

        let long = "x".repeat(81);
        assert!(validate_ice_breakers(&[long.as_str()]).is_err());
        let exact = "é".repeat(80);
        assert!(validate_ice_breakers(&[exact.as_str()]).is_ok());
    }
}
