mod metrics;
pub use metrics::*;
mod response;
pub use response::*;
mod spectrum;
pub use spectrum::*;
