use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};

use crate::train::progress::StepStats;

/// Which parameter-update strategy drives a run.
///
/// Chosen once before setup; the two paths are mutually exclusive within a
/// run and switching mid-run is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingMethod {
    /// Whole-batch gradient descent (`Network::step`).
    GradientDescent,
    /// Conjugate-gradient line-search minimizer (`Network::step_optimizer`).
    ConjugateGradient,
}

/// Configuration for a `train_network` run.
///
/// # Fields
/// - `method`      — parameter-update strategy for the whole run
/// - `reset`       — reallocate random weights (`true`) or fine-tune the
///                   existing set (`false`)
/// - `progress_tx` — optional channel sender; one `StepStats` is sent per
///                   completed step. If the receiver is dropped the run
///                   stops early (clean shutdown).
/// - `stop_flag`   — optional atomic flag; when set to `true` from another
///                   thread the run stops before the next step.
pub struct TrainConfig {
    pub method: TrainingMethod,
    pub reset: bool,
    pub progress_tx: Option<mpsc::Sender<StepStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel and no stop flag.
    pub fn new(method: TrainingMethod, reset: bool) -> TrainConfig {
        TrainConfig {
            method,
            reset,
            progress_tx: None,
            stop_flag: None,
        }
    }
}
