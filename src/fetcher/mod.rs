pub mod client;
pub mod errors;
pub mod pipeline;
pub mod types;

pub use client::{USER_AGENT, build_client, fetch};
pub use errors::FetchError;
pub use types::{Charset, PageResponse};
