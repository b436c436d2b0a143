/// A differentiable objective over a flat parameter vector.
///
/// The minimizer sees the network exclusively through this interface: one
/// call evaluates the objective at `params` and returns the scalar cost
/// together with the gradient, flattened in the same element order as the
/// parameter vector.
pub trait CostFunction {
    fn evaluate(&mut self, params: &[f64]) -> (f64, Vec<f64>);
}
