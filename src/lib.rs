pub mod analysis;
pub mod coupling;
pub mod error;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod signal;
pub mod utils;

pub use error::{Result, SimError};
