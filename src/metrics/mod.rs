pub mod tracker;

pub use tracker::{EpochStats, SolverMetrics};
