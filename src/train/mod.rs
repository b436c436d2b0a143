pub mod config;
pub mod progress;
pub mod runner;

pub use config::{TrainConfig, TrainingMethod};
pub use progress::StepStats;
pub use runner::{train_network, TrainOutcome};
