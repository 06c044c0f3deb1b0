use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::{extractor::ExtractError, fetcher::FetchError};

/// Failures of the scrape endpoints. Bodies are plain text.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ScrapeError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ScrapeError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ScrapeError::Extraction(_) => {
                warn!("no article container found");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Could not extract blog content".to_string(),
                )
            }
            ScrapeError::Fetch(err) => {
                error!(error = ?err, "page fetch failed");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", err))
            }
            ScrapeError::Internal(message) => {
                error!(error = %message, "scrape failed");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", message))
            }
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ScrapeError::Validation("Missing 'url' field".into()), StatusCode::BAD_REQUEST),
            (ScrapeError::Extraction(ExtractError::NoArticle), StatusCode::UNPROCESSABLE_ENTITY),
            (ScrapeError::Fetch(FetchError::RequestTimeout), StatusCode::INTERNAL_SERVER_ERROR),
            (ScrapeError::Internal("panicked".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
