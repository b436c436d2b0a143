use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use dnn_classifier::{
    train_network, CgMinimizer, Matrix, Network, TrainConfig, TrainingMethod, TrainingObjective,
    TrainingOptions, TrainingPhase,
};

/// Two tight, linearly separable clusters: category 1 near the origin,
/// category 2 near (1, 1).
fn separable_data() -> (Matrix, Matrix) {
    let input = Matrix::from_rows(vec![
        vec![0.0, 0.1],
        vec![0.1, 0.0],
        vec![0.05, 0.05],
        vec![0.1, 0.1],
        vec![0.9, 1.0],
        vec![1.0, 0.9],
        vec![0.95, 0.95],
        vec![0.9, 0.9],
    ]);
    let labels = Matrix::from_rows(vec![
        vec![1.0],
        vec![1.0],
        vec![1.0],
        vec![1.0],
        vec![2.0],
        vec![2.0],
        vec![2.0],
        vec![2.0],
    ]);

    (input, labels)
}

fn separable_options() -> TrainingOptions {
    TrainingOptions {
        alpha: 2.0,
        epochs: 100_000,
        inputs: 2,
        nodes: 8,
        items: 8,
        categories: 2,
        tolerance: 1e-3,
        hidden_layers: 1,
        use_l2: false,
    }
}

#[test]
fn separable_training_converges_and_classifies() {
    let (input, labels) = separable_data();
    let opts = separable_options();

    let mut network = Network::new();

    // Random init can land in a poor basin; a couple of restarts keeps the
    // test stable without loosening the assertions.
    for _ in 0..3 {
        network.setup(&labels, &opts, true);
        while !network.step(&input, &opts) {}

        if network.iterations < opts.epochs && !network.cost.is_nan() {
            break;
        }
    }

    assert!(
        network.iterations < opts.epochs,
        "expected convergence below tolerance, got cost {} after {} iterations",
        network.cost,
        network.iterations
    );
    assert!(!network.cost.is_nan());
    assert!(network.cost < opts.tolerance);
    assert_eq!(network.phase(), TrainingPhase::Converged);

    let classes = network.classify(&input, &opts, 0.5);
    assert_eq!(classes, vec![1, 1, 1, 1, 2, 2, 2, 2]);
}

#[test]
fn deep_network_steps_through_multiple_hidden_layers() {
    let (input, labels) = separable_data();
    let opts = TrainingOptions {
        alpha: 0.5,
        epochs: 10,
        tolerance: 0.0,
        hidden_layers: 2,
        ..separable_options()
    };

    let mut network = Network::new();
    network.setup(&labels, &opts, true);

    // Consecutive steps re-run the forward pass over all three layers.
    for _ in 0..5 {
        network.step(&input, &opts);
    }

    assert_eq!(network.iterations, 5);
    assert_eq!(network.y.rows(), 8);
    assert_eq!(network.y.cols(), 2);
    assert!(network.cost.is_finite());
}

#[test]
fn l2_objective_drives_convergence_when_selected() {
    let (input, labels) = separable_data();
    let opts = TrainingOptions {
        use_l2: true,
        tolerance: 0.01,
        ..separable_options()
    };

    let mut network = Network::new();

    for _ in 0..3 {
        network.setup(&labels, &opts, true);
        while !network.step(&input, &opts) {}

        if network.iterations < opts.epochs && !network.l2.is_nan() {
            break;
        }
    }

    assert!(network.iterations < opts.epochs);
    assert!(network.l2 < opts.tolerance);
    // Cross-entropy is still well above the threshold when the squared
    // error crosses it, so the selector really keyed on l2.
    assert!(
        network.cost >= opts.tolerance,
        "cost {} already below tolerance; the objective selection is untested",
        network.cost
    );
}

#[test]
fn nan_objective_signals_convergence_without_an_update() {
    let (input, labels) = separable_data();
    let opts = separable_options();

    let mut network = Network::new();
    network.setup(&labels, &opts, true);

    let mut poisoned = input.clone();
    *poisoned.at_mut(0, 0) = f64::NAN;

    let weights_before = network.weights.clone();

    assert!(network.step(&poisoned, &opts));
    assert!(network.cost.is_nan());
    assert_eq!(network.iterations, 1);
    assert_eq!(network.phase(), TrainingPhase::Converged);
    assert_eq!(network.weights, weights_before);
}

#[test]
fn conjugate_gradient_path_converges() {
    let (input, labels) = separable_data();
    let opts = TrainingOptions {
        epochs: 300,
        ..separable_options()
    };

    let mut network = Network::new();
    let config = TrainConfig::new(TrainingMethod::ConjugateGradient, true);

    let mut outcome = train_network(&mut network, &input, &labels, &opts, &config);
    for _ in 0..2 {
        if outcome.cost < 0.5 {
            break;
        }
        outcome = train_network(&mut network, &input, &labels, &opts, &config);
    }

    assert!(outcome.converged);
    assert!(!outcome.stopped);
    assert!(
        outcome.cost < 0.5,
        "line-search training failed to reduce the cost: {}",
        outcome.cost
    );
    assert!(outcome.iterations <= opts.epochs);
}

#[test]
fn optimizer_path_l2_matches_the_accepted_weights() {
    let (input, labels) = separable_data();
    let opts = TrainingOptions {
        use_l2: true,
        epochs: 50,
        tolerance: 1e-12,
        ..separable_options()
    };

    let mut network = Network::new();
    network.setup_optimizer(&labels, &opts, true);

    let x0 = network.reshape_weights();
    let mut minimizer = {
        let mut objective = TrainingObjective::new(&mut network, &input);
        CgMinimizer::new(&mut objective, x0)
    };

    for _ in 0..3 {
        if network.step_optimizer(&mut minimizer, &input, &opts) {
            break;
        }
    }

    // The reported l2 must describe the written-back weights, not the line
    // search's last trial point.
    let reported = network.l2;
    network.forward(&input);
    network.backward(&input);

    assert_eq!(network.l2, reported);
}

#[test]
fn epoch_cap_fires_exactly_on_the_capth_step() {
    let (input, labels) = separable_data();
    let opts = TrainingOptions {
        alpha: 0.1,
        epochs: 5,
        tolerance: 0.0, // unreachable: the objective is strictly positive
        ..separable_options()
    };

    let mut network = Network::new();
    network.setup(&labels, &opts, true);

    for step in 1..=opts.epochs {
        let converged = network.step(&input, &opts);
        assert_eq!(
            converged,
            step == opts.epochs,
            "convergence signalled at step {step}"
        );
    }

    assert_eq!(network.iterations, opts.epochs);
}

#[test]
fn stepping_after_convergence_is_a_noop() {
    let (input, labels) = separable_data();
    let opts = TrainingOptions {
        alpha: 0.1,
        epochs: 3,
        tolerance: 0.0,
        ..separable_options()
    };

    let mut network = Network::new();
    network.setup(&labels, &opts, true);
    while !network.step(&input, &opts) {}

    assert_eq!(network.phase(), TrainingPhase::Converged);

    let weights_before: Vec<Matrix> = network.weights.clone();
    let iterations_before = network.iterations;

    assert!(network.step(&input, &opts));
    assert_eq!(network.iterations, iterations_before);
    assert_eq!(network.weights, weights_before);
}

#[test]
#[should_panic(expected = "call setup()")]
fn stepping_an_uninitialized_network_panics() {
    let (input, _) = separable_data();
    let opts = separable_options();

    let mut network = Network::new();
    network.step(&input, &opts);
}

#[test]
fn runner_reports_progress_and_outcome() {
    let (input, labels) = separable_data();
    let opts = TrainingOptions {
        alpha: 0.1,
        epochs: 5,
        tolerance: 0.0,
        ..separable_options()
    };

    let (tx, rx) = mpsc::channel();
    let mut config = TrainConfig::new(TrainingMethod::GradientDescent, true);
    config.progress_tx = Some(tx);

    let mut network = Network::new();
    let outcome = train_network(&mut network, &input, &labels, &opts, &config);

    assert!(outcome.converged);
    assert!(!outcome.stopped);
    assert_eq!(outcome.iterations, opts.epochs);

    drop(config);
    let stats: Vec<_> = rx.iter().collect();
    assert_eq!(stats.len(), opts.epochs);
    for (index, step) in stats.iter().enumerate() {
        assert_eq!(step.iteration, index + 1);
        assert_eq!(step.total_epochs, opts.epochs);
    }
}

#[test]
fn stop_flag_ends_the_run_before_the_first_step() {
    let (input, labels) = separable_data();
    let opts = separable_options();

    let flag = Arc::new(AtomicBool::new(false));
    flag.store(true, Ordering::Relaxed);

    let mut config = TrainConfig::new(TrainingMethod::GradientDescent, true);
    config.stop_flag = Some(Arc::clone(&flag));

    let mut network = Network::new();
    let outcome = train_network(&mut network, &input, &labels, &opts, &config);

    assert!(outcome.stopped);
    assert!(!outcome.converged);
    assert_eq!(outcome.iterations, 0);
}
