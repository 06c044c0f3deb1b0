use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::config::{ENV_HCTI_API_KEY, ENV_HCTI_USER_ID};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("HCTI credentials not configured")]
    NotConfigured,

    #[error("Missing 'html'")]
    MissingHtml,

    #[error("{0}")]
    Upstream(String),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenderErrorResponse {
    pub ok: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        let (status, hint) = match &self {
            RenderError::NotConfigured => (
                StatusCode::NOT_IMPLEMENTED,
                Some(format!(
                    "Set {} and {} in the service environment.",
                    ENV_HCTI_USER_ID, ENV_HCTI_API_KEY
                )),
            ),
            RenderError::MissingHtml => (StatusCode::BAD_REQUEST, None),
            RenderError::Upstream(message) => {
                error!(error = %message, "rendering API call failed");
                (StatusCode::BAD_GATEWAY, None)
            }
        };

        (
            status,
            Json(RenderErrorResponse {
                ok: false,
                error: self.to_string(),
                hint,
            }),
        )
            .into_response()
    }
}
