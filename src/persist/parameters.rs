use serde::{Serialize, Deserialize};
use crate::error::{NnError, Result};
use crate::graph::topology::Topology;

/// Flat copy of an instance's trainable values.
///
/// `weights` lists every connection's weight in connection-id order and
/// `biases` every non-input node's bias in node-id order. The values are
/// positional: they only mean something for an identically shaped topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
}

impl Parameters {
    pub fn new(weights: Vec<f64>, biases: Vec<f64>) -> Parameters {
        Parameters { weights, biases }
    }

    /// Fails with a persistence error unless the counts match `topology`.
    pub fn check_fits(&self, topology: &Topology) -> Result<()> {
        let expected_weights = topology.connection_count();
        if self.weights.len() != expected_weights {
            return Err(NnError::persistence(format!(
                "{} weights do not fit a topology with {expected_weights} connections",
                self.weights.len()
            )));
        }
        let expected_biases = topology.bias_count();
        if self.biases.len() != expected_biases {
            return Err(NnError::persistence(format!(
                "{} biases do not fit a topology with {expected_biases} computed nodes",
                self.biases.len()
            )));
        }
        Ok(())
    }
}
