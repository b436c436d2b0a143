use crate::math::matrix::Matrix;
use crate::network::options::TrainingOptions;
use crate::optim::cg::CgMinimizer;
use crate::optim::objective::CostFunction;

/// Where a network sits in its training lifecycle.
///
/// `setup` moves any state to `Configured`; the first `step` enters
/// `Stepping`; a converged/NaN/epoch-capped step lands in `Converged`.
/// Stepping a `Converged` network without a fresh `setup` is a no-op that
/// keeps returning `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingPhase {
    Uninitialized,
    Configured,
    Stepping,
    Converged,
}

/// A feed-forward classifier trained by whole-batch gradient descent or,
/// through [`TrainingObjective`], by the conjugate-gradient minimizer.
///
/// Weight layout: one matrix per layer boundary, shaped
/// `(outputs, inputs + 1)`; the extra column is the bias, which pairs with
/// the constant-1 column bound onto every layer's input.
#[derive(Debug)]
pub struct Network {
    pub weights: Vec<Matrix>,
    // Forward-pass intermediates, kept for the backward pass and dropped at
    // the start of the next forward pass.
    x: Vec<Matrix>,
    z: Vec<Matrix>,
    // Per-step gradients, cleared after every update.
    deltas: Vec<Matrix>,
    /// Output of the most recent forward pass, one row per example.
    pub y: Matrix,
    y_true: Matrix,
    /// Mean binary cross-entropy of the most recent backward pass.
    pub cost: f64,
    /// Mean squared output error of the most recent backward pass.
    pub l2: f64,
    pub iterations: usize,
    phase: TrainingPhase,
}

impl Network {
    pub fn new() -> Network {
        Network {
            weights: vec![],
            x: vec![],
            z: vec![],
            deltas: vec![],
            y: Matrix::default(),
            y_true: Matrix::default(),
            cost: 1.0,
            l2: 1.0,
            iterations: 0,
            phase: TrainingPhase::Uninitialized,
        }
    }

    /// Builds a network around an existing weight set (e.g. one loaded from
    /// disk). Panics unless consecutive layers chain: each layer's output
    /// count must equal the next layer's input count.
    pub fn from_weights(weights: Vec<Matrix>) -> Network {
        assert!(!weights.is_empty(), "from_weights: empty weight set");

        for layer in 0..weights.len() - 1 {
            assert_eq!(
                weights[layer].rows() + 1,
                weights[layer + 1].cols(),
                "from_weights: layer {} outputs {} values but layer {} expects {}",
                layer,
                weights[layer].rows(),
                layer + 1,
                weights[layer + 1].cols() - 1
            );
        }

        Network {
            phase: TrainingPhase::Configured,
            ..Network::new()
        }
        .with_weights(weights)
    }

    fn with_weights(mut self, weights: Vec<Matrix>) -> Network {
        self.weights = weights;
        self
    }

    pub fn phase(&self) -> TrainingPhase {
        self.phase
    }

    /// Input feature count, derived from the first layer's shape.
    pub fn inputs(&self) -> usize {
        self.weights[0].cols() - 1
    }

    /// Output category count, derived from the last layer's shape.
    pub fn categories(&self) -> usize {
        self.weights.last().map_or(0, |w| w.rows())
    }

    pub fn hidden_layers(&self) -> usize {
        self.weights.len() - 1
    }

    // ── Setup ───────────────────────────────────────────────────────────

    /// Prepares the network for a training run.
    ///
    /// When `reset` is true the weight set is reallocated with fresh uniform
    /// `[-1, 1)` values; with `reset = false` existing weights (a previous
    /// run, or a loaded model) are kept and fine-tuned. Either way the
    /// target labels are re-encoded and the counters reset.
    pub fn setup(&mut self, labels: &Matrix, opts: &TrainingOptions, reset: bool) {
        if reset {
            self.weights.clear();
            self.weights.push(Matrix::random(opts.nodes, opts.inputs + 1));

            for _ in 1..opts.hidden_layers {
                self.weights.push(Matrix::random(opts.nodes, opts.nodes + 1));
            }

            self.weights.push(Matrix::random(opts.categories, opts.nodes + 1));
        } else {
            assert!(
                !self.weights.is_empty(),
                "setup: reset = false requires an allocated or loaded weight set"
            );
        }

        self.y_true = Self::encode_labels(labels, opts);

        self.x.clear();
        self.z.clear();
        self.deltas.clear();

        self.cost = 1.0;
        self.l2 = 1.0;
        self.iterations = 0;
        self.phase = TrainingPhase::Configured;
    }

    /// One-hot (or binary passthrough) target encoding.
    ///
    /// With `categories > 1` every target in `1..=categories` becomes the
    /// matching row of the identity matrix; with `categories == 1` the
    /// scalar target passes through unchanged.
    fn encode_labels(labels: &Matrix, opts: &TrainingOptions) -> Matrix {
        assert_eq!(
            labels.rows(),
            opts.items,
            "labels: {} rows for {} configured items",
            labels.rows(),
            opts.items
        );

        let mut result = Matrix::zeros(opts.items, opts.categories);
        let eye = Matrix::identity(opts.categories);

        for y in 0..opts.items {
            if opts.categories > 1 {
                let label = labels.at(y, 0) as usize;
                assert!(
                    (1..=opts.categories).contains(&label),
                    "labels: category {} at row {} outside 1..={}",
                    label,
                    y,
                    opts.categories
                );

                for x in 0..opts.categories {
                    *result.at_mut(y, x) = eye.at(label - 1, x);
                }
            } else {
                *result.at_mut(y, 0) = labels.at(y, 0);
            }
        }

        result
    }

    // ── Forward / backward ──────────────────────────────────────────────

    /// Forward pass over the whole input matrix.
    ///
    /// Retains the bias-augmented input `x` and pre-activation `z` of every
    /// layer for the backward pass; buffers from the previous pass are
    /// dropped on entry.
    pub fn forward(&mut self, input: &Matrix) {
        assert!(
            !self.weights.is_empty(),
            "forward: no weights allocated; call setup() or load a model"
        );
        assert_eq!(
            input.cols(),
            self.inputs(),
            "forward: input has {} features, network expects {}",
            input.cols(),
            self.inputs()
        );

        self.x.clear();
        self.z.clear();

        let bias = Matrix::filled(input.rows(), 1, 1.0);
        let last = self.weights.len() - 1;

        let mut xx = bias.column_bind(input);

        for layer in 0..self.weights.len() {
            let zz = xx.multiply(&self.weights[layer].transpose());
            let activation = zz.sigmoid();

            self.x.push(xx);
            self.z.push(zz);

            // Pushing moved the layer input; rebind unconditionally so the
            // next iteration always has a live one.
            xx = if layer != last {
                bias.column_bind(&activation)
            } else {
                self.y = activation;
                Matrix::default()
            };
        }
    }

    /// Backward pass: backpropagated error terms, per-layer gradients, and
    /// the cost/L2 diagnostics.
    ///
    /// Only cross-entropy drives the analytic gradient; L2 is a secondary
    /// convergence signal read off the output error.
    pub fn backward(&mut self, input: &Matrix) {
        let last = self.weights.len() - 1;
        let items = input.rows() as f64;

        // Error terms, output first: d[0] = y − y_true, then each hidden
        // layer's error projected back through the next layer's weights
        // (bias column stripped) and masked by the activation gradient.
        let mut d: Vec<Matrix> = Vec::with_capacity(self.weights.len());
        d.push(self.y.difference(&self.y_true));

        for layer in (0..last).rev() {
            let prev = d.len() - 1;

            let next = &self.weights[layer + 1];
            let mut w = Matrix::zeros(next.rows(), next.cols() - 1);
            w.copy_region_from(next, 0, 1);

            let dz = self.z[layer].sigmoid_derivative();

            let mut term = Matrix::zeros(d[prev].rows(), w.cols());
            term.multiply_into(&d[prev], &w);
            term.hadamard_assign(&dz);

            d.push(term);
        }

        self.deltas.clear();
        let scale = 1.0 / items;

        for layer in 0..self.weights.len() {
            let td = d[last - layer].transpose();

            let mut delta = Matrix::zeros(self.weights[layer].rows(), self.weights[layer].cols());
            delta.multiply_into(&td, &self.x[layer]);

            self.deltas.push(delta.map(|v| v * scale));
        }

        let mut cost = 0.0;
        let mut l2 = 0.0;

        for ((predicted, expected), error) in self
            .y
            .as_slice()
            .iter()
            .zip(self.y_true.as_slice())
            .zip(d[0].as_slice())
        {
            cost += -expected * predicted.ln() - (1.0 - expected) * (1.0 - predicted).ln();
            l2 += 0.5 * error * error;
        }

        self.cost = cost / items;
        self.l2 = l2 / items;
    }

    fn apply_gradients(&mut self, opts: &TrainingOptions) {
        for (w, delta) in self.weights.iter_mut().zip(self.deltas.iter()) {
            w.add_scaled(delta, -opts.alpha);
        }
    }

    fn clear_deltas(&mut self) {
        self.deltas.clear();
    }

    // ── Training step ───────────────────────────────────────────────────

    /// One whole-batch gradient-descent step. Returns `true` once training
    /// has converged: the configured objective went NaN, dropped below
    /// tolerance, or the iteration count reached the epoch cap.
    pub fn step(&mut self, input: &Matrix, opts: &TrainingOptions) -> bool {
        match self.phase {
            TrainingPhase::Uninitialized => panic!("step: call setup() before stepping"),
            TrainingPhase::Converged => return true,
            _ => self.phase = TrainingPhase::Stepping,
        }
        assert!(
            self.y_true.rows() > 0,
            "step: labels not encoded; call setup() first"
        );

        self.forward(input);
        self.backward(input);

        let objective = if opts.use_l2 { self.l2 } else { self.cost };
        let optimized = objective.is_nan() || objective < opts.tolerance;

        // A NaN or already-met objective skips the update, so a diverged
        // step can never poison the weights.
        if !optimized {
            self.apply_gradients(opts);
        }

        self.clear_deltas();
        self.iterations += 1;

        let converged = optimized || self.iterations >= opts.epochs;
        if converged {
            self.phase = TrainingPhase::Converged;
        }

        converged
    }

    /// Fresh setup followed by stepping to convergence.
    pub fn train(&mut self, input: &Matrix, labels: &Matrix, opts: &TrainingOptions) {
        self.setup(labels, opts, true);

        while !self.step(input, opts) {}
    }

    // ── Conjugate-gradient path ─────────────────────────────────────────

    /// Mirror of [`Network::setup`] for the minimizer-driven path. The
    /// caller seeds a [`CgMinimizer`] with [`Network::reshape_weights`] and
    /// a [`TrainingObjective`]; the two training paths are mutually
    /// exclusive within one run.
    pub fn setup_optimizer(&mut self, labels: &Matrix, opts: &TrainingOptions, reset: bool) {
        self.setup(labels, opts, reset);
    }

    /// One outer minimizer iteration. Writes the minimizer's current
    /// parameter vector back into the weight set, mirrors its iteration
    /// count and best objective onto `iterations`/`cost`, and applies the
    /// same convergence test as [`Network::step`].
    pub fn step_optimizer(
        &mut self,
        minimizer: &mut CgMinimizer,
        input: &Matrix,
        opts: &TrainingOptions,
    ) -> bool {
        match self.phase {
            TrainingPhase::Uninitialized => panic!("step_optimizer: call setup_optimizer() first"),
            TrainingPhase::Converged => return true,
            _ => self.phase = TrainingPhase::Stepping,
        }

        {
            let mut objective = TrainingObjective::new(self, input);
            minimizer.step(&mut objective);
        }

        // A rejected line search restores the minimizer's previous point;
        // writing its vector back keeps the weight set on that point rather
        // than on the last trial evaluation.
        self.write_weights(minimizer.params());
        self.iterations = minimizer.iterations();
        self.cost = minimizer.cost();

        // The last trial evaluation may not be the accepted point, so l2
        // lags the written-back weights; refresh it when it is the
        // convergence objective.
        if opts.use_l2 {
            self.forward(input);
            self.backward(input);
            self.clear_deltas();
        }

        let objective = if opts.use_l2 { self.l2 } else { self.cost };
        let converged =
            objective.is_nan() || objective < opts.tolerance || self.iterations >= opts.epochs;
        if converged {
            self.phase = TrainingPhase::Converged;
        }

        converged
    }

    /// Flattens the weight set into one parameter vector: layer-major,
    /// column-major element order within each layer.
    pub fn reshape_weights(&self) -> Vec<f64> {
        let total: usize = self.weights.iter().map(|w| w.rows() * w.cols()).sum();
        let mut flat = Vec::with_capacity(total);

        for w in &self.weights {
            for col in 0..w.cols() {
                for row in 0..w.rows() {
                    flat.push(w.at(row, col));
                }
            }
        }

        flat
    }

    /// Writes a flattened parameter vector back into the weight set, in
    /// [`Network::reshape_weights`] element order.
    pub fn write_weights(&mut self, params: &[f64]) {
        let total: usize = self.weights.iter().map(|w| w.rows() * w.cols()).sum();
        assert_eq!(
            params.len(),
            total,
            "write_weights: expected {} parameters, got {}",
            total,
            params.len()
        );

        let mut index = 0;
        for w in &mut self.weights {
            for col in 0..w.cols() {
                for row in 0..w.rows() {
                    *w.at_mut(row, col) = params[index];
                    index += 1;
                }
            }
        }
    }

    fn reshape_gradients(&self) -> Vec<f64> {
        let total: usize = self.deltas.iter().map(|d| d.rows() * d.cols()).sum();
        let mut flat = Vec::with_capacity(total);

        for delta in &self.deltas {
            for col in 0..delta.cols() {
                for row in 0..delta.rows() {
                    flat.push(delta.at(row, col));
                }
            }
        }

        flat
    }

    // ── Inference ───────────────────────────────────────────────────────

    /// Classifies every row of `test`: `argmax + 1` over the category
    /// activations when multi-class (ties break to the lowest index), or
    /// `1` when the scalar output strictly exceeds `threshold` when binary.
    pub fn classify(&mut self, test: &Matrix, opts: &TrainingOptions, threshold: f64) -> Vec<usize> {
        self.forward(test);

        let mut classification = Vec::with_capacity(test.rows());

        for y in 0..test.rows() {
            if opts.categories > 1 {
                let mut max_val = f64::MIN;
                let mut max_idx = 0;

                for x in 0..opts.categories {
                    let val = self.y.at(y, x);

                    if val > max_val {
                        max_val = val;
                        max_idx = x;
                    }
                }

                classification.push(max_idx + 1);
            } else {
                classification.push(usize::from(self.y.at(y, 0) > threshold));
            }
        }

        self.release_intermediates();

        classification
    }

    /// Like [`Network::classify`] but returns the raw maximal activation
    /// (or the raw scalar output when binary) per example.
    pub fn predict(&mut self, test: &Matrix, opts: &TrainingOptions) -> Vec<f64> {
        self.forward(test);

        let mut prediction = Vec::with_capacity(test.rows());

        for y in 0..test.rows() {
            if opts.categories > 1 {
                let mut max_val = f64::MIN;

                for x in 0..opts.categories {
                    max_val = max_val.max(self.y.at(y, x));
                }

                prediction.push(max_val);
            } else {
                prediction.push(self.y.at(y, 0));
            }
        }

        self.release_intermediates();

        prediction
    }

    fn release_intermediates(&mut self) {
        self.x.clear();
        self.z.clear();
        self.y = Matrix::default();
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::new()
    }
}

/// Flattened-parameter view of a network bound to its training input; the
/// explicit cost/gradient interface handed to the minimizer.
pub struct TrainingObjective<'a> {
    network: &'a mut Network,
    input: &'a Matrix,
}

impl<'a> TrainingObjective<'a> {
    pub fn new(network: &'a mut Network, input: &'a Matrix) -> TrainingObjective<'a> {
        TrainingObjective { network, input }
    }
}

impl CostFunction for TrainingObjective<'_> {
    /// Writes `params` into the weight set, runs a forward and backward
    /// pass, and returns the cross-entropy cost with the flattened gradient
    /// (same element order as the parameter vector).
    fn evaluate(&mut self, params: &[f64]) -> (f64, Vec<f64>) {
        self.network.write_weights(params);
        self.network.forward(self.input);
        self.network.backward(self.input);

        let gradient = self.network.reshape_gradients();
        self.network.clear_deltas();

        (self.network.cost, gradient)
    }
}
