use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument};

use crate::{
    config::{Config, HctiCredentials},
    render::{dtos::RenderPayload, errors::RenderError},
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the htmlcsstoimage.com rendering API.
#[derive(Clone)]
pub struct HctiClient {
    http: Client,
    endpoint: String,
    credentials: Option<HctiCredentials>,
}

impl HctiClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.render_timeout())
            .build()?;

        Ok(Self {
            http,
            endpoint: config.hcti_api_url().to_string(),
            credentials: config.hcti_credentials().cloned(),
        })
    }

    /// Credentials, if rendering is enabled.
    pub fn credentials(&self) -> Option<&HctiCredentials> {
        self.credentials.as_ref()
    }

    /// Submit `payload` and return the API's JSON answer as-is. A single
    /// attempt is made.
    #[instrument(skip_all, fields(endpoint = %self.endpoint, html_len = payload.html.len()))]
    pub async fn render(
        &self,
        credentials: &HctiCredentials,
        payload: &RenderPayload,
    ) -> Result<Value, RenderError> {
        let response = self
            .http
            .post(&self.endpoint)
            .basic_auth(&credentials.user_id, Some(&credentials.api_key))
            .form(payload)
            .send()
            .await
            .map_err(|err| RenderError::Upstream(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Upstream(format!(
                "rendering API responded with {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| RenderError::Upstream(err.to_string()))?;

        info!(%status, "image rendered");
        Ok(body)
    }
}
