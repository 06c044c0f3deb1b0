use crate::{config::Config, fetcher, render::HctiClient};
use reqwest::Client;
use std::sync::Arc;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub page_client: Client,
    pub renderer: HctiClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            page_client: fetcher::build_client(config.fetch_timeout())?,
            renderer: HctiClient::new(&config)?,
            config: Arc::new(config),
        })
    }
}
