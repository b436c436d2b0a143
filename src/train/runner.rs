use std::sync::atomic::Ordering;
use std::time::Instant;

use crate::math::matrix::Matrix;
use crate::network::network::{Network, TrainingObjective};
use crate::network::options::TrainingOptions;
use crate::optim::cg::CgMinimizer;
use crate::train::config::{TrainConfig, TrainingMethod};
use crate::train::progress::StepStats;

/// Terminal state of a training run.
#[derive(Debug, Clone, Copy)]
pub struct TrainOutcome {
    pub iterations: usize,
    pub cost: f64,
    pub l2: f64,
    /// The convergence test fired: objective NaN, below tolerance, or the
    /// epoch cap was reached.
    pub converged: bool,
    /// The run ended early via the stop flag or a dropped receiver.
    pub stopped: bool,
}

/// Drives one full training run: sets the network up for the configured
/// method, then steps until convergence, a set stop flag, or a dropped
/// progress receiver.
///
/// The network is mutated in place and remains usable afterwards for
/// `classify`/`predict` or for persistence.
pub fn train_network(
    network: &mut Network,
    input: &Matrix,
    labels: &Matrix,
    opts: &TrainingOptions,
    config: &TrainConfig,
) -> TrainOutcome {
    let mut minimizer = match config.method {
        TrainingMethod::GradientDescent => {
            network.setup(labels, opts, config.reset);
            None
        }
        TrainingMethod::ConjugateGradient => {
            network.setup_optimizer(labels, opts, config.reset);

            let x0 = network.reshape_weights();
            let mut objective = TrainingObjective::new(network, input);
            Some(CgMinimizer::new(&mut objective, x0))
        }
    };

    let mut converged = false;
    let mut stopped = false;

    loop {
        // Check the stop flag before committing to another step.
        if stop_requested(config) {
            stopped = true;
            break;
        }

        let t_start = Instant::now();

        let done = match minimizer.as_mut() {
            None => network.step(input, opts),
            Some(minimizer) => network.step_optimizer(minimizer, input, opts),
        };

        if let Some(ref tx) = config.progress_tx {
            let stats = StepStats {
                iteration: network.iterations,
                total_epochs: opts.epochs,
                cost: network.cost,
                l2: network.l2,
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            };

            // A dropped receiver means the driver went away; stop cleanly.
            if tx.send(stats).is_err() {
                stopped = true;
                break;
            }
        }

        if done {
            converged = true;
            break;
        }
    }

    TrainOutcome {
        iterations: network.iterations,
        cost: network.cost,
        l2: network.l2,
        converged,
        stopped,
    }
}

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}
