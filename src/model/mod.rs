pub mod json;

pub use json::{from_json, load_model, save_model, to_json, ModelJson};
