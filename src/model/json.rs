//! JSON persistence for trained models.
//!
//! Canonical schema: `{ "Weights": [ [[f64]], ... ], "Normalization": [[f64]] }`.
//! `Weights` holds one row-major matrix per layer — row = output unit,
//! column = input feature including the bias. `Normalization` is optional
//! (older schema revisions omit it); when present it is two equal-length
//! rows, min then max. Architecture is never read from options on load: it
//! is inferred entirely from the matrix shapes.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::normalize::Normalization;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::network::network::Network;

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelJson {
    #[serde(rename = "Weights")]
    pub weights: Vec<Vec<Vec<f64>>>,
    #[serde(rename = "Normalization", default, skip_serializing_if = "Option::is_none")]
    pub normalization: Option<Vec<Vec<f64>>>,
}

impl ModelJson {
    pub fn from_network(network: &Network, normalization: Option<&Normalization>) -> ModelJson {
        ModelJson {
            weights: network.weights.iter().map(Matrix::to_rows).collect(),
            normalization: normalization.map(|n| vec![n.min.clone(), n.max.clone()]),
        }
    }

    /// Validates the matrix shapes and rebuilds the in-memory model; on any
    /// failure nothing is constructed. Inference of the architecture:
    /// `inputs` = layer 0's row length − 1, `categories` = the last layer's
    /// row count, `hidden_layers` = matrix count − 1.
    pub fn into_parts(self) -> Result<(Network, Option<Normalization>)> {
        if self.weights.is_empty() {
            return Err(Error::InvalidModel("no weight matrices".into()));
        }

        for (layer, rows) in self.weights.iter().enumerate() {
            let cols = rows.first().map_or(0, Vec::len);

            if rows.is_empty() || cols == 0 {
                return Err(Error::InvalidModel(format!(
                    "layer {layer}: empty weight matrix"
                )));
            }
            if rows.iter().any(|row| row.len() != cols) {
                return Err(Error::InvalidModel(format!(
                    "layer {layer}: ragged weight matrix"
                )));
            }
        }

        for layer in 0..self.weights.len() - 1 {
            let outputs = self.weights[layer].len();
            let next_inputs = self.weights[layer + 1][0].len() - 1;

            if outputs != next_inputs {
                return Err(Error::InvalidModel(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    layer,
                    outputs,
                    layer + 1,
                    next_inputs
                )));
            }
        }

        let normalization = match self.normalization {
            Some(rows) => {
                if rows.len() != 2 || rows[0].len() != rows[1].len() {
                    return Err(Error::InvalidModel(
                        "normalization must be two equal-length rows (min, max)".into(),
                    ));
                }
                Some(Normalization {
                    min: rows[0].clone(),
                    max: rows[1].clone(),
                })
            }
            None => None,
        };

        let weights = self.weights.into_iter().map(Matrix::from_rows).collect();

        Ok((Network::from_weights(weights), normalization))
    }
}

/// Serializes a network (and optionally its normalization vectors) to the
/// canonical JSON string.
pub fn to_json(network: &Network, normalization: Option<&Normalization>) -> Result<String> {
    Ok(serde_json::to_string(&ModelJson::from_network(
        network,
        normalization,
    ))?)
}

/// Parses and validates a canonical JSON string.
pub fn from_json(json: &str) -> Result<(Network, Option<Normalization>)> {
    let model: ModelJson = serde_json::from_str(json)?;
    model.into_parts()
}

fn model_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.json"))
}

/// Writes the model as UTF-8 JSON to `{dir}/{name}.json`.
pub fn save_model(
    dir: &Path,
    name: &str,
    network: &Network,
    normalization: Option<&Normalization>,
) -> Result<()> {
    let file = File::create(model_path(dir, name))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, &ModelJson::from_network(network, normalization))?;
    writer.flush()?;

    Ok(())
}

/// Reads and validates `{dir}/{name}.json`. The loaded network is ready for
/// inference or for `setup(..., reset = false)` fine-tuning; on failure the
/// caller's prior in-memory state is untouched.
pub fn load_model(dir: &Path, name: &str) -> Result<(Network, Option<Normalization>)> {
    let file = File::open(model_path(dir, name))?;
    let reader = BufReader::new(file);

    let model: ModelJson = serde_json::from_reader(reader)?;
    model.into_parts()
}
