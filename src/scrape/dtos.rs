use serde::Deserialize;
use utoipa::ToSchema;

const MAX_URL_LEN: usize = 2048;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ScrapeRequest {
    /// Page to scrape.
    #[schema(example = "https://example.com/blog-post")]
    pub url: Option<String>,
}

impl ScrapeRequest {
    /// Parse a request body without trusting its content type. A body that
    /// is not a JSON object with a string `url` counts as having no url.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// The trimmed url, or a message for the client.
    pub fn validate(&self) -> Result<&str, String> {
        let url = self.url.as_deref().map(str::trim).unwrap_or_default();
        if url.is_empty() {
            return Err("Missing 'url' field".to_string());
        }
        if url.len() > MAX_URL_LEN {
            return Err("URL too long".to_string());
        }
        Ok(url)
    }
}
