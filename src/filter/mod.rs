mod apply;
pub use apply::*;
mod cutoff;
pub use cutoff::*;
mod design;
pub use design::*;
