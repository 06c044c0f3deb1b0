use axum::{
    Json, Router,
    extract::Request,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app_state::AppState,
    config::{ENV_HCTI_API_KEY, ENV_HCTI_USER_ID},
    extractor::ScrapeResult,
    health,
    render::{
        self,
        dtos::{RenderRequest, RenderResponse},
        errors::RenderErrorResponse,
    },
    scrape::{self, dtos::ScrapeRequest},
};

pub const SERVICE_NAME: &str = "blogscrape";

#[derive(OpenApi)]
#[openapi(
    paths(
        index,
        health::health_check,
        scrape::handlers::scrape_blog,
        scrape::handlers::scrape_deel,
        render::handlers::html_to_image
    ),
    components(schemas(
        ServiceInfo,
        ScrapeRequest,
        ScrapeResult,
        RenderRequest,
        RenderResponse,
        RenderErrorResponse
    )),
    tags(
        (name = "scrape", description = "Article extraction"),
        (name = "render", description = "HTML to image proxy")
    )
)]
pub struct ApiDoc;

#[derive(Serialize, ToSchema)]
pub struct ServiceInfo {
    ok: bool,
    service: String,
    #[schema(value_type = Object)]
    endpoints: Value,
}

/// Describe the service and how to call it.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service descriptor", body = ServiceInfo))
)]
pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        ok: true,
        service: format!("{} scraper", SERVICE_NAME),
        endpoints: json!({
            "POST /scrape-blog": { "body": { "url": "https://example.com/blog-post" } },
            "POST /scrape-deel": { "body": { "url": "https://www.deel.com/blog/some-post" } },
            "POST /html-to-image": {
                "requires_env": [ENV_HCTI_USER_ID, ENV_HCTI_API_KEY],
                "body": { "html": "<div>...</div>", "css": "/* optional */", "width": 800 }
            }
        }),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(health::health_check))
        .route("/scrape-blog", post(scrape::handlers::scrape_blog))
        .route("/scrape-deel", post(scrape::handlers::scrape_deel))
        .route("/html-to-image", post(render::handlers::html_to_image))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Layers run bottom-up: the request id is set before the trace span opens.
        .layer(CatchPanicLayer::new())
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
