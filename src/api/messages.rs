//! Message API
//!
//! Template, carousel, product and call-to-action sends, plus media id
//! generation and template validity windows. All calls are app-scoped.

use std::sync::Arc;

use serde_json::Value;

use super::{PartnerApi, PartnerContext};
use crate::error::GupshupError;
use crate::types::{Params, RequestSpec};

const SEND_PATH: &str = "/partner/app/message/send";

/// Media header attached to a template message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateMedia {
    Image(String),
    Video(String),
    Document(String),
}

impl TemplateMedia {
    fn field(&self) -> (&'static str, &str) {
        match self {
            Self::Image(url) => ("imageUrl", url),
            Self::Video(url) => ("videoUrl", url),
            Self::Document(url) => ("documentUrl", url),
        }
    }
}

/// A template message to one destination.
///
/// ```
/// use gupshup_partner_sdk::api::messages::TemplateMessage;
///
/// let message = TemplateMessage::new("5511999999999", "order_update")
///     .params(["#1234", "shipped"])
///     .image_url("https://cdn.example.com/box.png");
/// assert_eq!(message.template_id(), "order_update");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMessage {
    destination: String,
    template_id: String,
    params: Vec<String>,
    media: Option<TemplateMedia>,
    location: Option<Value>,
    lto_data: Option<Value>,
}

impl TemplateMessage {
    pub fn new(destination: impl Into<String>, template_id: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            template_id: template_id.into(),
            params: Vec::new(),
            media: None,
            location: None,
            lto_data: None,
        }
    }

    /// Positional values for the template placeholders.
    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn image_url(self, url: impl Into<String>) -> Self {
        self.media(TemplateMedia::Image(url.into()))
    }

    pub fn video_url(self, url: impl Into<String>) -> Self {
        self.media(TemplateMedia::Video(url.into()))
    }

    pub fn document_url(self, url: impl Into<String>) -> Self {
        self.media(TemplateMedia::Document(url.into()))
    }

    pub fn media(mut self, media: TemplateMedia) -> Self {
        self.media = Some(media);
        self
    }

    pub fn location(mut self, location: Value) -> Self {
        self.location = Some(location);
        self
    }

    /// Limited-time-offer payload.
    pub fn lto_data(mut self, lto_data: Value) -> Self {
        self.lto_data = Some(lto_data);
        self
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    fn to_params(&self, app_id: &str) -> Params {
        let mut params = Params::new()
            .with("appId", app_id)
            .with("destination", self.destination.as_str())
            .with("templateId", self.template_id.as_str())
            .with_json("params", &Value::from(self.params.clone()));

        if let Some(media) = &self.media {
            let (key, url) = media.field();
            if !url.is_empty() {
                params = params.with(key, url);
            }
        }
        if let Some(location) = self.location.as_ref().filter(|v| !is_empty_value(v)) {
            params = params.with_json("location", location);
        }
        if let Some(lto_data) = self.lto_data.as_ref().filter(|v| !is_empty_value(v)) {
            params = params.with_json("ltoData", lto_data);
        }
        params
    }
}

/// Template categories that accept a validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityCategory {
    Utility,
    Authentication,
}

impl ValidityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utility => "UTILITY",
            Self::Authentication => "AUTHENTICATION",
        }
    }
}

pub struct MessagesApi {
    context: Arc<PartnerContext>,
}

impl MessagesApi {
    pub fn new(context: Arc<PartnerContext>) -> Self {
        Self { context }
    }

    pub async fn send_template(
        &self,
        app_id: &str,
        message: &TemplateMessage,
    ) -> Result<Value, GupshupError> {
        let spec = RequestSpec::post(SEND_PATH).params(message.to_params(app_id));
        self.context.app_call(app_id, spec).await
    }

    pub async fn send_carousel(
        &self,
        app_id: &str,
        destination: &str,
        template_id: &str,
        cards: &[Value],
    ) -> Result<Value, GupshupError> {
        let params = Params::new()
            .with("appId", app_id)
            .with("destination", destination)
            .with("templateId", template_id)
            .with_json("cards", &Value::from(cards.to_vec()));
        self.context
            .app_call(app_id, RequestSpec::post(SEND_PATH).params(params))
            .await
    }

    pub async fn send_product(
        &self,
        app_id: &str,
        destination: &str,
        product: &Value,
    ) -> Result<Value, GupshupError> {
        let params = Params::new()
            .with("appId", app_id)
            .with("destination", destination)
            .with_json("product", product);
        self.context
            .app_call(
                app_id,
                RequestSpec::post("/partner/app/message/product").params(params),
            )
            .await
    }

    /// Call-to-action session message.
    pub async fn send_cta(
        &self,
        app_id: &str,
        destination: &str,
        cta_data: &Value,
    ) -> Result<Value, GupshupError> {
        let params = Params::new()
            .with("appId", app_id)
            .with("destination", destination)
            .with_json("ctaData", cta_data);
        self.context
            .app_call(
                app_id,
                RequestSpec::post("/partner/app/message/cta").params(params),
            )
            .await
    }

    pub async fn generate_media_id(&self, app_id: &str) -> Result<Value, GupshupError> {
        let params = Params::new().with("appId", app_id);
        self.context
            .app_call(
                app_id,
                RequestSpec::post("/partner/app/media/generate").params(params),
            )
            .await
    }

    pub async fn set_template_validity(
        &self,
        app_id: &str,
        template_id: &str,
        validity_minutes: u32,
        category: ValidityCategory,
    ) -> Result<Value, GupshupError> {
        let params = Params::new()
            .with("appId", app_id)
            .with("templateId", template_id)
            .with("validity", validity_minutes.to_string())
            .with("category", category.as_str());
        self.context
            .app_call(
                app_id,
                RequestSpec::post("/partner/app/template/validity").params(params),
            )
            .await
    }
}

impl PartnerApi for MessagesApi {
    fn context(&self) -> &PartnerContext {
        &self.context
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
