pub mod app;
pub mod app_state;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod health;
pub mod render;
pub mod scrape;
pub mod telemetry;
