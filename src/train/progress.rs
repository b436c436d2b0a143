use serde::{Deserialize, Serialize};

/// Per-step training statistics emitted by `train_network`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the runner
/// sends one `StepStats` value after every completed step. Receivers use
/// this to drive progress displays and live charts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepStats {
    /// 1-based step number (the network's iteration counter after the step).
    pub iteration: usize,
    /// Epoch cap requested for this run.
    pub total_epochs: usize,
    /// Mean binary cross-entropy after the step.
    pub cost: f64,
    /// Mean squared output error after the step.
    pub l2: f64,
    /// Wall-clock duration of this single step in milliseconds.
    pub elapsed_ms: u64,
}
