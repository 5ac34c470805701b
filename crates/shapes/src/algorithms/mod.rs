pub mod preprocessing;
pub mod extraction;
pub mod simplification;
pub mod metrics;
pub mod classification;

pub use preprocessing::*;
pub use extraction::*;
pub use simplification::*;
pub use metrics::*;
pub use classification::*;
