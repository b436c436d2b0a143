pub mod data;
pub mod error;
pub mod math;
pub mod model;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use data::normalize::Normalization;
pub use error::{Error, Result};
pub use math::matrix::Matrix;
pub use model::json::{from_json, load_model, save_model, to_json};
pub use network::network::{Network, TrainingObjective, TrainingPhase};
pub use network::options::TrainingOptions;
pub use optim::cg::CgMinimizer;
pub use optim::objective::CostFunction;
pub use train::config::{TrainConfig, TrainingMethod};
pub use train::progress::StepStats;
pub use train::runner::{train_network, TrainOutcome};
