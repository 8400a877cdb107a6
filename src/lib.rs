// Core modules
pub mod api;
pub mod backtest;
pub mod error;
pub mod indicators;
pub mod models;
pub mod strategy;

// Re-export commonly used types
pub use api::PriceSource;
pub use error::Error;
pub use models::*;

pub type Result<T> = std::result::Result<T, Error>;
