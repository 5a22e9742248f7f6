mod client;
mod config;
mod error;
mod models;

pub use client::{HttpGenreProvider, HttpPuzzleProvider};
pub use config::HttpProviderConfig;
pub use error::{HttpProviderError, HttpResult};
