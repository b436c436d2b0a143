pub mod normalize;

pub use normalize::Normalization;
