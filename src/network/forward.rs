use crate::error::{NnError, Result};
use crate::graph::NodeId;
use crate::network::network::{Network, Phase};

impl Network {
    /// Forward pass; leaves every node's activation set for backprop and
    /// returns the output layer's activations.
    ///
    /// Layers are computed in strictly ascending order, so a layer only ever
    /// reads final activations of the layer below it. A wrongly sized input
    /// is rejected before any node is touched.
    pub fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        let expected = self.topology.input_count;
        if input.len() != expected {
            return Err(NnError::InputShape { what: "input sample", got: input.len(), expected });
        }

        // Error terms of the previous sample are stale from here on.
        self.phase = Phase::Idle;

        for (index, &value) in self.layers[0].clone().zip(input) {
            self.set_activation(NodeId(index), value)?;
        }

        for layer in 1..self.layers.len() {
            self.compute_layer(layer);
        }

        self.phase = Phase::Forwarded;
        Ok(self.output())
    }

    /// Forward pass followed by argmax over the output layer.
    pub fn predict(&mut self, input: &[f64]) -> Result<usize> {
        let output = self.forward(input)?;
        Ok(argmax(&output))
    }

    fn compute_layer(&mut self, layer: usize) {
        let activation = self.activation_for(layer);
        for index in self.layers[layer].clone() {
            let pre_activation: f64 = self.nodes[index].backward.iter()
                .map(|id| {
                    let connection = &self.connections[id.0];
                    self.nodes[connection.source.0].activation * connection.weight
                })
                .sum();

            let node = &mut self.nodes[index];
            node.pre_activation = pre_activation;
            node.activation = activation.function(pre_activation - node.bias);
        }
    }
}

/// Index of the largest value; the first one wins ties.
pub fn argmax(values: &[f64]) -> usize {
    values.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[]), 0);
    }
}
