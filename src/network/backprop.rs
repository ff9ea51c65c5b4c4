use log::trace;

use crate::error::{NnError, Result};
use crate::network::forward::argmax;
use crate::network::network::{Network, Phase};
use crate::persist::parameters::Parameters;

/// New values for every weight and bias, derived from one sample.
///
/// Produced by [`Network::compute_update`] from the parameters as they were
/// before the update, applied all at once by [`Network::commit`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterUpdate {
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
}

impl ParameterUpdate {
    pub fn into_parameters(self) -> Parameters {
        Parameters::new(self.weights, self.biases)
    }
}

/// Outcome of one full training cycle on one instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cycle {
    /// Sum of the output layer's absolute error terms.
    pub cost: f64,
    /// Whether the output argmax matched the target argmax.
    pub correct: bool,
}

impl Network {
    /// Computes every computed node's error term against `target` and returns
    /// the sample's cost.
    ///
    /// Output errors come first; hidden layers follow from `L_max - 1` down to
    /// 1, each reading only the already final errors of the layer above it.
    pub fn backward(&mut self, target: &[f64]) -> Result<f64> {
        if self.phase == Phase::Idle {
            return Err(NnError::OutOfOrder { operation: "backward pass", required: "forward pass" });
        }
        let expected = self.topology.output_count;
        if target.len() != expected {
            return Err(NnError::InputShape { what: "target", got: target.len(), expected });
        }

        let last = self.last_layer();
        let output_fn = self.activation_for(last);
        let mut cost = 0.0;
        for (index, &t) in self.layers[last].clone().zip(target) {
            let node = &mut self.nodes[index];
            let derivative = output_fn.derivative(node.net_input(), node.activation);
            node.error = derivative * (t - node.activation);
            cost += node.error.abs();
        }

        for layer in (1..last).rev() {
            let hidden_fn = self.activation_for(layer);
            for index in self.layers[layer].clone() {
                let downstream: f64 = self.nodes[index].forward.iter()
                    .map(|id| {
                        let connection = &self.connections[id.0];
                        connection.weight * self.nodes[connection.destination.0].error
                    })
                    .sum();

                let node = &mut self.nodes[index];
                node.error = hidden_fn.derivative(node.net_input(), node.activation) * downstream;
            }
        }

        self.phase = Phase::Backpropagated;
        Ok(cost)
    }

    /// Derives new weights and biases from the current error terms.
    ///
    /// Reads the network without modifying it, so every value is computed
    /// from the pre-update parameters:
    /// - `w' = w + lr * error(destination) * activation(source)`
    /// - `b' = b - lr * error(node)`
    pub fn compute_update(&self, learning_rate: f64) -> Result<ParameterUpdate> {
        if self.phase != Phase::Backpropagated {
            return Err(NnError::OutOfOrder { operation: "parameter update", required: "backward pass" });
        }

        let weights = self.connections.iter()
            .map(|c| {
                let error = self.nodes[c.destination.0].error;
                let activation = self.nodes[c.source.0].activation;
                c.weight + learning_rate * error * activation
            })
            .collect();

        let biases = self.nodes[self.topology.input_count..].iter()
            .map(|n| n.bias - learning_rate * n.error)
            .collect();

        Ok(ParameterUpdate { weights, biases })
    }

    /// Applies an update produced for this topology. Either every weight and
    /// bias is replaced or, on a size mismatch, none is.
    pub fn commit(&mut self, update: &ParameterUpdate) -> Result<()> {
        let expected = self.connections.len();
        if update.weights.len() != expected {
            return Err(NnError::InputShape { what: "update weights", got: update.weights.len(), expected });
        }
        let expected = self.topology.bias_count();
        if update.biases.len() != expected {
            return Err(NnError::InputShape { what: "update biases", got: update.biases.len(), expected });
        }

        self.write_parameters(&update.weights, &update.biases);
        // Activations and errors now describe the old parameters.
        self.phase = Phase::Idle;
        Ok(())
    }

    /// One forward -> backward -> commit cycle. Any failure leaves the
    /// parameters exactly as they were.
    pub fn train_cycle(&mut self, input: &[f64], target: &[f64], learning_rate: f64) -> Result<Cycle> {
        let output = self.forward(input)?;
        let cost = self.backward(target)?;
        let update = self.compute_update(learning_rate)?;
        self.commit(&update)?;

        let correct = argmax(&output) == argmax(target);
        self.runs += 1;
        self.total_cost += cost;
        if correct {
            self.correct += 1;
        }
        trace!("cycle {}: cost {:.6}, correct {}", self.runs, cost, correct);

        Ok(Cycle { cost, correct })
    }
}
