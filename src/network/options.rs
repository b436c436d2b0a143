/// Configuration for one training run.
///
/// Immutable once a run starts: `setup` and `step` take it by reference and
/// never write back. All values come from the caller; the engine reads no
/// configuration from the environment or from disk.
///
/// # Fields
/// - `alpha`         — gradient-descent learning rate
/// - `epochs`        — iteration cap; the only bound on total run length
/// - `inputs`        — input-layer feature count
/// - `nodes`         — nodes per hidden layer
/// - `items`         — training example count
/// - `categories`    — output category count; 1 selects binary encoding
/// - `tolerance`     — convergence threshold on the objective
/// - `hidden_layers` — hidden-layer count, at least 1
/// - `use_l2`        — objective selector: mean squared error instead of
///                     cross-entropy for the convergence test
#[derive(Debug, Clone, Copy)]
pub struct TrainingOptions {
    pub alpha: f64,
    pub epochs: usize,
    pub inputs: usize,
    pub nodes: usize,
    pub items: usize,
    pub categories: usize,
    pub tolerance: f64,
    pub hidden_layers: usize,
    pub use_l2: bool,
}

impl TrainingOptions {
    /// Single-hidden-layer configuration.
    pub fn new(
        alpha: f64,
        epochs: usize,
        categories: usize,
        inputs: usize,
        nodes: usize,
        items: usize,
        tolerance: f64,
    ) -> TrainingOptions {
        TrainingOptions {
            alpha,
            epochs,
            inputs,
            nodes,
            items,
            categories,
            tolerance,
            hidden_layers: 1,
            use_l2: false,
        }
    }

    /// Deep configuration; `hidden_layers` is clamped to at least 1.
    #[allow(clippy::too_many_arguments)]
    pub fn with_hidden_layers(
        alpha: f64,
        epochs: usize,
        categories: usize,
        inputs: usize,
        nodes: usize,
        items: usize,
        tolerance: f64,
        hidden_layers: usize,
    ) -> TrainingOptions {
        TrainingOptions {
            hidden_layers: hidden_layers.max(1),
            ..TrainingOptions::new(alpha, epochs, categories, inputs, nodes, items, tolerance)
        }
    }
}

impl Default for TrainingOptions {
    fn default() -> Self {
        TrainingOptions {
            alpha: 1.0,
            epochs: 1,
            inputs: 2,
            nodes: 16,
            items: 50,
            categories: 2,
            tolerance: 0.001,
            hidden_layers: 1,
            use_l2: false,
        }
    }
}
