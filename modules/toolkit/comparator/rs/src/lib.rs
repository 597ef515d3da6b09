pub use comparator::Comparator;
pub use config::{Config, DEFAULT_NUM_SAMPLES};
pub use report::{PairStats, Report};

mod comparator;
mod config;
mod report;
pub mod sampler;
pub mod walker;
