use serde::{Serialize, Deserialize};
use crate::error::{NnError, Result};

/// Shape of a dense feed-forward network.
///
/// Layer 0 holds `input_count` nodes, layers `1..=hidden_layer_count` hold
/// `hidden_width` nodes each and the last layer holds `output_count` nodes.
/// A topology is owned by its instance and never changes after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub input_count: usize,
    pub hidden_layer_count: usize,
    pub hidden_width: usize,
    pub output_count: usize,
}

impl Topology {
    pub fn new(
        input_count: usize,
        hidden_layer_count: usize,
        hidden_width: usize,
        output_count: usize,
    ) -> Topology {
        Topology { input_count, hidden_layer_count, hidden_width, output_count }
    }

    /// Fails with a configuration error if any layer would be empty or the
    /// node or connection count does not fit in a `usize`.
    pub fn validate(&self) -> Result<()> {
        let empty_layer = if self.input_count == 0 {
            Some(0)
        } else if self.hidden_layer_count > 0 && self.hidden_width == 0 {
            Some(1)
        } else if self.output_count == 0 {
            Some(self.hidden_layer_count.saturating_add(1))
        } else {
            None
        };
        if let Some(layer) = empty_layer {
            return Err(NnError::configuration(format!(
                "layer {layer} of {:?} would have zero nodes",
                self
            )));
        }
        self.checked_counts()
            .map(|_| ())
            .ok_or_else(|| NnError::configuration(format!("{self:?} has more nodes or connections than a usize can count")))
    }

    /// Node and connection counts, or `None` on overflow.
    fn checked_counts(&self) -> Option<(usize, usize)> {
        let hidden_nodes = self.hidden_layer_count.checked_mul(self.hidden_width)?;
        let nodes = self.input_count
            .checked_add(hidden_nodes)?
            .checked_add(self.output_count)?;

        let (first, last) = if self.hidden_layer_count == 0 {
            (self.input_count.checked_mul(self.output_count)?, 0)
        } else {
            (
                self.input_count.checked_mul(self.hidden_width)?,
                self.hidden_width.checked_mul(self.output_count)?,
            )
        };
        let between = self.hidden_width
            .checked_mul(self.hidden_width)?
            .checked_mul(self.hidden_layer_count.saturating_sub(1))?;
        let connections = first.checked_add(between)?.checked_add(last)?;
        Some((nodes, connections))
    }

    /// Node count of every layer, input first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.layer_count());
        sizes.push(self.input_count);
        sizes.extend(std::iter::repeat(self.hidden_width).take(self.hidden_layer_count));
        sizes.push(self.output_count);
        sizes
    }

    pub fn layer_count(&self) -> usize {
        self.hidden_layer_count + 2
    }

    /// Index of the output layer.
    pub fn last_layer(&self) -> usize {
        self.hidden_layer_count + 1
    }

    /// Saturates at `usize::MAX` for descriptors that do not validate.
    pub fn node_count(&self) -> usize {
        self.checked_counts().map_or(usize::MAX, |(nodes, _)| nodes)
    }

    /// Dense wiring: |layer L| x |layer L+1| summed over adjacent pairs.
    pub fn connection_count(&self) -> usize {
        self.checked_counts().map_or(usize::MAX, |(_, connections)| connections)
    }

    /// One bias per computed (non-input) node.
    pub fn bias_count(&self) -> usize {
        self.node_count() - self.input_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_sizes_follow_the_descriptor() {
        let t = Topology::new(3, 2, 4, 2);
        assert_eq!(t.layer_sizes(), vec![3, 4, 4, 2]);
        assert_eq!(t.last_layer(), 3);
        assert_eq!(t.node_count(), 13);
        assert_eq!(t.connection_count(), 3 * 4 + 4 * 4 + 4 * 2);
        assert_eq!(t.bias_count(), 10);
    }

    #[test]
    fn no_hidden_layers_wires_input_to_output() {
        let t = Topology::new(2, 0, 0, 1);
        assert!(t.validate().is_ok());
        assert_eq!(t.layer_sizes(), vec![2, 1]);
        assert_eq!(t.connection_count(), 2);
    }

    #[test]
    fn empty_layers_are_rejected() {
        assert!(matches!(Topology::new(0, 1, 3, 1).validate(), Err(NnError::Configuration { .. })));
        assert!(matches!(Topology::new(2, 1, 0, 1).validate(), Err(NnError::Configuration { .. })));
        assert!(matches!(Topology::new(2, 1, 3, 0).validate(), Err(NnError::Configuration { .. })));
    }

    #[test]
    fn overflowing_counts_are_rejected() {
        for topology in [
            Topology::new(usize::MAX, 0, 0, 1),
            Topology::new(2, 2, usize::MAX / 2, 1),
            Topology::new(1 << 40, 1, 1 << 40, 1),
            Topology::new(2, usize::MAX, 1, 1),
        ] {
            assert!(
                matches!(topology.validate(), Err(NnError::Configuration { .. })),
                "{topology:?} should not validate"
            );
        }
    }

    #[test]
    fn counts_match_the_layer_sizes() {
        for t in [Topology::new(784, 2, 128, 10), Topology::new(3, 0, 0, 4), Topology::new(5, 3, 2, 1)] {
            let sizes = t.layer_sizes();
            assert_eq!(t.node_count(), sizes.iter().sum::<usize>());
            assert_eq!(t.connection_count(), sizes.windows(2).map(|p| p[0] * p[1]).sum::<usize>());
        }
    }
}
