use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::render::errors::RenderError;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RenderRequest {
    /// Markup to render.
    pub html: Option<String>,
    /// Extra stylesheet applied to `html`.
    pub css: Option<String>,
    /// Viewport width in pixels.
    #[schema(value_type = Option<u32>, example = 800)]
    pub width: Option<Value>,
}

/// Form fields sent to the rendering API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderPayload {
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport_width: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenderResponse {
    pub ok: bool,
    /// Upstream response, passed through untouched.
    #[schema(value_type = Object)]
    pub hcti: Value,
}

impl RenderRequest {
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Drop blank optional fields and require `html`.
    pub fn into_payload(self) -> Result<RenderPayload, RenderError> {
        let viewport_width = self.viewport_width();
        let html = self
            .html
            .filter(|html| !html.is_empty())
            .ok_or(RenderError::MissingHtml)?;

        Ok(RenderPayload {
            html,
            css: self.css.filter(|css| !css.is_empty()),
            viewport_width,
        })
    }

    // Zero and blank values mean "not set".
    fn viewport_width(&self) -> Option<String> {
        match self.width.as_ref()? {
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }
}
