pub mod network;
pub mod options;

pub use network::{Network, TrainingObjective, TrainingPhase};
pub use options::TrainingOptions;
