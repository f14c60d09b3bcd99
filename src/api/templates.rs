//! Template Management API
//!
//! All calls are app-scoped and carry the app token as `apikey`.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{PartnerApi, PartnerContext};
use crate::error::GupshupError;
use crate::types::{HttpMethod, Params, RequestSpec};
use crate::utils::encode_path_segment;

const TEMPLATE_PATH: &str = "/partner/app/template";

/// Template flavours accepted by the create endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Text,
    Image,
    Video,
    Document,
    Location,
    Catalog,
    CarouselImage,
    CarouselVideo,
    Authentication,
}

impl TemplateKind {
    /// Fields preset for this kind. Caller data may override any of them.
    pub fn preset_fields(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Text => &[("templateType", "TEXT")],
            Self::Image => &[("templateType", "IMAGE")],
            Self::Video => &[("templateType", "VIDEO")],
            Self::Document => &[("templateType", "DOCUMENT")],
            Self::Location => &[("templateType", "LOCATION")],
            Self::Catalog => &[("templateType", "CATALOG")],
            Self::CarouselImage => &[("templateType", "CAROUSEL"), ("carouselType", "IMAGE")],
            Self::CarouselVideo => &[("templateType", "CAROUSEL"), ("carouselType", "VIDEO")],
            Self::Authentication => &[("category", "AUTHENTICATION")],
        }
    }
}

pub struct TemplatesApi {
    context: Arc<PartnerContext>,
}

impl TemplatesApi {
    pub fn new(context: Arc<PartnerContext>) -> Self {
        Self { context }
    }

    pub async fn list(&self, app_id: &str) -> Result<Value, GupshupError> {
        let spec = RequestSpec::get(format!("{}/list", TEMPLATE_PATH))
            .params(Params::new().with("appId", app_id));
        self.context.app_call(app_id, spec).await
    }

    pub async fn get(&self, app_id: &str, template_id: &str) -> Result<Value, GupshupError> {
        let spec = RequestSpec::get(template_path(template_id))
            .params(Params::new().with("appId", app_id));
        self.context.app_call(app_id, spec).await
    }

    /// Submit a new template for approval.
    pub async fn create(
        &self,
        app_id: &str,
        kind: TemplateKind,
        data: &Map<String, Value>,
    ) -> Result<Value, GupshupError> {
        let params = kind
            .preset_fields()
            .iter()
            .fold(Params::new().with("appId", app_id), |params, (key, value)| {
                params.with(*key, *value)
            })
            .merge(data);
        let spec = RequestSpec::post(TEMPLATE_PATH).params(params);
        self.context.app_call(app_id, spec).await
    }

    pub async fn edit(
        &self,
        app_id: &str,
        template_id: &str,
        data: &Map<String, Value>,
    ) -> Result<Value, GupshupError> {
        let params = Params::new()
            .with("appId", app_id)
            .with("templateId", template_id)
            .merge(data);
        let spec = RequestSpec::new(HttpMethod::Put, TEMPLATE_PATH).params(params);
        self.context.app_call(app_id, spec).await
    }

    pub async fn delete(&self, app_id: &str, template_id: &str) -> Result<Value, GupshupError> {
        let spec = RequestSpec::new(HttpMethod::Delete, template_path(template_id))
            .params(Params::new().with("appId", app_id));
        self.context.app_call(app_id, spec).await
    }

    pub async fn delete_by_element_name(
        &self,
        app_id: &str,
        template_id: &str,
        element_name: &str,
    ) -> Result<Value, GupshupError> {
        let params = Params::new()
            .with("appId", app_id)
            .with("templateId", template_id)
            .with("elementName", element_name);
        let spec = RequestSpec::new(HttpMethod::Delete, TEMPLATE_PATH).params(params);
        self.context.app_call(app_id, spec).await
    }

    /// Templates whose `status` matches, ignoring case.
    pub async fn filter_by_status(
        &self,
        app_id: &str,
        status: &str,
    ) -> Result<Vec<Value>, GupshupError> {
        let list = self.list(app_id).await?;
        Ok(filter_templates(&list, "status", status))
    }

    /// Templates whose `category` matches, ignoring case.
    pub async fn filter_by_category(
        &self,
        app_id: &str,
        category: &str,
    ) -> Result<Vec<Value>, GupshupError> {
        let list = self.list(app_id).await?;
        Ok(filter_templates(&list, "category", category))
    }

    pub async fn approved(&self, app_id: &str) -> Result<Vec<Value>, GupshupError> {
        self.filter_by_status(app_id, "APPROVED").await
    }

    pub async fn rejected(&self, app_id: &str) -> Result<Vec<Value>, GupshupError> {
        self.filter_by_status(app_id, "REJECTED").await
    }

    pub async fn pending(&self, app_id: &str) -> Result<Vec<Value>, GupshupError> {
        self.filter_by_status(app_id, "PENDING").await
    }
}

impl PartnerApi for TemplatesApi {
    fn context(&self) -> &PartnerContext {
        &self.context
    }
}

fn template_path(template_id: &str) -> String {
    format!("{}/{}", TEMPLATE_PATH, encode_path_segment(template_id))
}

fn filter_templates(list: &Value, field: &str, wanted: &str) -> Vec<Value> {
    list.get("templates")
        .and_then(Value::as_array)
        .map(|templates| {
            templates
                .iter()
                .filter(|template| {
                    template
                        .get(field)
                        .and_then(Value::as_str)
                        .is_some_and(|value| value.eq_ignore_ascii_case(wanted))
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}
