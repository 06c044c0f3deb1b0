use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use tower::ServiceExt;

use blogscrape::{app, app_state::AppState, config::Config};

pub fn test_app(config: Config) -> Router {
    let state = AppState::new(config).expect("Failed to build app state");
    app::router(state)
}

pub async fn post_json(app: Router, uri: &str, body: String) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .map(|value| value.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}
