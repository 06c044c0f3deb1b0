pub mod client;
pub mod dtos;
pub mod errors;
pub mod handlers;

pub use client::HctiClient;
pub use errors::RenderError;
