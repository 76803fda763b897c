mod commands;
mod error;
mod log;
mod summary;
pub mod config;

pub use commands::Commands;
pub use error::require_input;
pub use error::Error;
pub use self::log::*;
pub use summary::RunSummary;
