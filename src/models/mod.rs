mod models;
pub use models::*;
mod config;
pub use config::*;
