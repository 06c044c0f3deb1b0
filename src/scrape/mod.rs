pub mod dtos;
pub mod errors;
pub mod handlers;

pub use errors::ScrapeError;
