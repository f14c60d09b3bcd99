//! WhatsApp Flows API
//!
//! Flow lifecycle (create, edit, publish, deprecate) and subscriptions. All
//! calls are app-scoped.

use std::sync::Arc;

use log::debug;
use serde_json::{Map, Value};

use super::apps::app_path;
use super::{PartnerApi, PartnerContext};
use crate::error::GupshupError;
use crate::types::{HttpMethod, Params, RequestSpec};
use crate::utils::encode_path_segment;

pub struct FlowsApi {
    context: Arc<PartnerContext>,
}

impl FlowsApi {
    pub fn new(context: Arc<PartnerContext>) -> Self {
        Self { context }
    }

    pub async fn list(&self, app_id: &str) -> Result<Value, GupshupError> {
        self.context
            .app_call(app_id, RequestSpec::get(app_path(app_id, "flows")))
            .await
    }

    pub async fn create<S: AsRef<str>>(
        &self,
        app_id: &str,
        name: &str,
        categories: &[S],
    ) -> Result<Value, GupshupError> {
        let categories: Vec<&str> = categories.iter().map(AsRef::as_ref).collect();
        let params = Params::new()
            .with("name", name)
            .with_json("categories", &serde_json::json!(categories));
        self.context
            .app_call(
                app_id,
                RequestSpec::post(app_path(app_id, "flow")).params(params),
            )
            .await
    }

    pub async fn update(
        &self,
        app_id: &str,
        flow_id: &str,
        data: &Map<String, Value>,
    ) -> Result<Value, GupshupError> {
        let spec = RequestSpec::new(HttpMethod::Put, flow_path(app_id, flow_id, ""))
            .params(Params::new().merge(data));
        self.context.app_call(app_id, spec).await
    }

    /// Replace the flow definition; sent as JSON text in the `json` field.
    pub async fn update_json(
        &self,
        app_id: &str,
        flow_id: &str,
        json: &Value,
    ) -> Result<Value, GupshupError> {
        let params = Params::new().with("json", json.to_string());
        self.context
            .app_call(
                app_id,
                RequestSpec::post(flow_path(app_id, flow_id, "json")).params(params),
            )
            .await
    }

    pub async fn get_json(&self, app_id: &str, flow_id: &str) -> Result<Value, GupshupError> {
        self.context
            .app_call(app_id, RequestSpec::get(flow_path(app_id, flow_id, "json")))
            .await
    }

    pub async fn preview_url(&self, app_id: &str, flow_id: &str) -> Result<Value, GupshupError> {
        self.context
            .app_call(
                app_id,
                RequestSpec::get(flow_path(app_id, flow_id, "preview")),
            )
            .await
    }

    pub async fn deprecate(&self, app_id: &str, flow_id: &str) -> Result<Value, GupshupError> {
        self.context
            .app_call(
                app_id,
                RequestSpec::post(flow_path(app_id, flow_id, "deprecate")),
            )
            .await
    }

    pub async fn delete(&self, app_id: &str, flow_id: &str) -> Result<Value, GupshupError> {
        self.context
            .app_call(
                app_id,
                RequestSpec::new(HttpMethod::Delete, flow_path(app_id, flow_id, "")),
            )
            .await
    }

    pub async fn publish(&self, app_id: &str, flow_id: &str) -> Result<Value, GupshupError> {
        self.context
            .app_call(
                app_id,
                RequestSpec::post(flow_path(app_id, flow_id, "publish")),
            )
            .await
    }

    pub async fn get(&self, app_id: &str, flow_id: &str) -> Result<Value, GupshupError> {
        self.context
            .app_call(app_id, RequestSpec::get(flow_path(app_id, flow_id, "")))
            .await
    }

    pub async fn subscribe(
        &self,
        app_id: &str,
        flow_id: &str,
        subscription: &Map<String, Value>,
    ) -> Result<Value, GupshupError> {
        let spec = RequestSpec::post(flow_path(app_id, flow_id, "subscribe"))
            .params(Params::new().merge(subscription));
        self.context.app_call(app_id, spec).await
    }

    pub async fn unsubscribe(
        &self,
        app_id: &str,
        flow_id: &str,
        subscription_id: &str,
    ) -> Result<Value, GupshupError> {
        let suffix = format!("subscription/{}", encode_path_segment(subscription_id));
        self.context
            .app_call(
                app_id,
                RequestSpec::new(HttpMethod::Delete, flow_path(app_id, flow_id, &suffix)),
            )
            .await
    }

    pub async fn unsubscribe_all(&self, app_id: &str, flow_id: &str) -> Result<Value, GupshupError> {
        self.context
            .app_call(
                app_id,
                RequestSpec::new(
                    HttpMethod::Delete,
                    flow_path(app_id, flow_id, "subscriptions"),
                ),
            )
            .await
    }

    /// Create a flow named `name` and load a Meta Playground export into it.
    ///
    /// # Errors
    /// - [`GupshupError::InvalidArgument`] when `meta_json` is not valid JSON (nothing is sent)
    /// - [`GupshupError::Api`] with status 0 when the create response lacks `flow.id`
    pub async fn import_from_meta(
        &self,
        app_id: &str,
        name: &str,
        meta_json: &str,
    ) -> Result<Value, GupshupError> {
        let definition: Value = serde_json::from_str(meta_json)
            .map_err(|e| GupshupError::InvalidArgument(format!("invalid flow JSON: {}", e)))?;

        let created = self.create::<&str>(app_id, name, &[]).await?;
        let flow_id = created_flow_id(&created).ok_or_else(|| {
            GupshupError::api(
                "flow creation response did not contain flow.id",
                0,
                created.to_string(),
            )
        })?;
        debug!("[GupshupPartner] created flow {} for app {}", flow_id, app_id);

        self.update_json(app_id, &flow_id, &definition).await
    }
}

impl PartnerApi for FlowsApi {
    fn context(&self) -> &PartnerContext {
        &self.context
    }
}

fn flow_path(app_id: &str, flow_id: &str, suffix: &str) -> String {
    let base = app_path(app_id, &format!("flow/{}", encode_path_segment(flow_id)));
    if suffix.is_empty() {
        base
    } else {
        format!("{}/{}", base, suffix)
    }
}

fn created_flow_id(response: &Value) -> Option<String> {
    match response.pointer("/flow/id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
