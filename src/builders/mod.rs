pub mod config;
pub mod model;

pub use config::SolverConfigBuilder;
pub use model::PomdpModelBuilder;
