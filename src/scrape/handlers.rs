use axum::{Json, body::Bytes, extract::State};
use tracing::{info, instrument};

use crate::{
    app_state::AppState,
    extractor::{self, LocateStrategy, ScrapeResult},
    fetcher,
    scrape::{dtos::ScrapeRequest, errors::ScrapeError},
};

#[utoipa::path(
    post,
    path = "/scrape-blog",
    tag = "scrape",
    request_body = ScrapeRequest,
    responses(
        (status = 200, description = "Extracted article", body = ScrapeResult),
        (status = 400, description = "Missing url", body = String, content_type = "text/plain"),
        (status = 422, description = "No article content found", body = String, content_type = "text/plain"),
        (status = 500, description = "Page could not be fetched", body = String, content_type = "text/plain")
    )
)]
pub async fn scrape_blog(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ScrapeResult>, ScrapeError> {
    let strategy = state.config.scrape_strategy();
    scrape(&state, &body, strategy).await.map(Json)
}

/// Same as `/scrape-blog`, with the "More resources" trailer trimmed.
#[utoipa::path(
    post,
    path = "/scrape-deel",
    tag = "scrape",
    request_body = ScrapeRequest,
    responses(
        (status = 200, description = "Extracted article", body = ScrapeResult),
        (status = 400, description = "Missing url", body = String, content_type = "text/plain"),
        (status = 422, description = "No article content found", body = String, content_type = "text/plain"),
        (status = 500, description = "Page could not be fetched", body = String, content_type = "text/plain")
    )
)]
pub async fn scrape_deel(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ScrapeResult>, ScrapeError> {
    scrape(&state, &body, LocateStrategy::TrailerTrimmed)
        .await
        .map(Json)
}

#[instrument(skip_all, fields(strategy = %strategy, url))]
async fn scrape(
    state: &AppState,
    body: &[u8],
    strategy: LocateStrategy,
) -> Result<ScrapeResult, ScrapeError> {
    let request = ScrapeRequest::from_body(body);
    let url = request.validate().map_err(ScrapeError::Validation)?;
    tracing::Span::current().record("url", url);

    let page = fetcher::fetch(&state.page_client, url).await?;

    // Parsing is CPU-bound and the parsed tree is not Send.
    let html = page.body_utf8;
    let result = tokio::task::spawn_blocking(move || extractor::extract(&html, strategy))
        .await
        .map_err(|err| ScrapeError::Internal(err.to_string()))??;

    info!(
        title = %result.title,
        images = result.images.len(),
        "article extracted"
    );
    Ok(result)
}
