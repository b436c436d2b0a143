pub mod cg;
pub mod objective;

pub use cg::CgMinimizer;
pub use objective::CostFunction;
