use axum::{Json, body::Bytes, extract::State};

use crate::{
    app_state::AppState,
    render::{
        dtos::{RenderRequest, RenderResponse},
        errors::{RenderError, RenderErrorResponse},
    },
};

#[utoipa::path(
    post,
    path = "/html-to-image",
    tag = "render",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Image rendered", body = RenderResponse),
        (status = 400, description = "Missing html", body = RenderErrorResponse),
        (status = 501, description = "Rendering credentials not configured", body = RenderErrorResponse),
        (status = 502, description = "Rendering API failed", body = RenderErrorResponse)
    )
)]
pub async fn html_to_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RenderResponse>, RenderError> {
    let credentials = state
        .renderer
        .credentials()
        .ok_or(RenderError::NotConfigured)?;

    let payload = RenderRequest::from_body(&body).into_payload()?;
    let hcti = state.renderer.render(credentials, &payload).await?;

    Ok(Json(RenderResponse { ok: true, hcti }))
}
