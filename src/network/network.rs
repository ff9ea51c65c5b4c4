use std::ops::Range;

use log::{debug, warn};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::activation::{ActivationFunction, ActivationScheme};
use crate::error::{NnError, Result};
use crate::graph::{Connection, ConnectionId, Node, NodeId, Topology};
use crate::persist::parameters::Parameters;

/// Initial connection weights are drawn uniformly from this range.
pub const WEIGHT_RANGE: (f64, f64) = (-1.0, 1.0);

/// Initial node biases are drawn uniformly from this range.
pub const BIAS_RANGE: (f64, f64) = (-15.0, 15.0);

/// Where an instance is in the forward / backward / update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Idle,
    Forwarded,
    Backpropagated,
}

/// One dense feed-forward network held as an explicit node/connection graph.
///
/// Nodes live in a pre-sized arena ordered layer by layer and connections
/// refer to them by index, so ids are local to the instance and stable for
/// its whole lifetime.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) topology: Topology,
    pub(crate) scheme: ActivationScheme,
    pub(crate) nodes: Vec<Node>,
    pub(crate) connections: Vec<Connection>,
    /// Node index range of every layer, input first.
    pub(crate) layers: Vec<Range<usize>>,
    pub(crate) phase: Phase,
    pub(crate) runs: usize,
    pub(crate) correct: usize,
    pub(crate) total_cost: f64,
}

impl Network {
    /// Builds a network with parameters drawn from the thread-local RNG.
    pub fn new(topology: Topology, scheme: ActivationScheme) -> Result<Network> {
        Network::build(topology, scheme, &mut rand::thread_rng())
    }

    /// Builds the layered graph for `topology`, wiring every pair of adjacent
    /// layers densely. Weights and biases are drawn from `rng`.
    pub fn build<R: Rng + ?Sized>(
        topology: Topology,
        scheme: ActivationScheme,
        rng: &mut R,
    ) -> Result<Network> {
        topology.validate()?;

        let weight_dist = Uniform::new_inclusive(WEIGHT_RANGE.0, WEIGHT_RANGE.1);
        let bias_dist = Uniform::new_inclusive(BIAS_RANGE.0, BIAS_RANGE.1);

        let mut nodes: Vec<Node> = Vec::new();
        reserve(&mut nodes, topology.node_count(), "nodes")?;
        let mut layers = Vec::with_capacity(topology.layer_count());
        for (layer, size) in topology.layer_sizes().into_iter().enumerate() {
            let start = nodes.len();
            for _ in 0..size {
                let id = NodeId(nodes.len());
                nodes.push(Node::new(id, layer, bias_dist.sample(rng)));
            }
            layers.push(start..nodes.len());
        }

        let mut connections: Vec<Connection> = Vec::new();
        reserve(&mut connections, topology.connection_count(), "connections")?;
        for pair in layers.windows(2) {
            for source in pair[0].clone() {
                for destination in pair[1].clone() {
                    let id = ConnectionId(connections.len());
                    connections.push(Connection {
                        id,
                        source: NodeId(source),
                        destination: NodeId(destination),
                        weight: weight_dist.sample(rng),
                    });
                    nodes[source].forward.push(id);
                    nodes[destination].backward.push(id);
                }
            }
        }

        debug!(
            "built network {:?}: {} nodes, {} connections, scheme {:?}",
            topology,
            nodes.len(),
            connections.len(),
            scheme
        );

        Ok(Network {
            topology,
            scheme,
            nodes,
            connections,
            layers,
            phase: Phase::Idle,
            runs: 0,
            correct: 0,
            total_cost: 0.0,
        })
    }

    /// Builds a network and immediately loads `parameters` into it.
    pub fn with_parameters(
        topology: Topology,
        scheme: ActivationScheme,
        parameters: &Parameters,
    ) -> Result<Network> {
        let mut network = Network::new(topology, scheme)?;
        network.load_parameters(parameters)?;
        Ok(network)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn scheme(&self) -> ActivationScheme {
        self.scheme
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id.0)
    }

    /// Nodes of one layer in id order; empty past the output layer.
    pub fn layer(&self, layer: usize) -> &[Node] {
        match self.layers.get(layer) {
            Some(range) => &self.nodes[range.clone()],
            None => &[],
        }
    }

    pub fn last_layer(&self) -> usize {
        self.topology.last_layer()
    }

    /// Activation function evaluated by the nodes of `layer`.
    pub fn activation_for(&self, layer: usize) -> ActivationFunction {
        self.scheme.for_layer(layer, self.last_layer())
    }

    /// Current activations of the output layer.
    pub fn output(&self) -> Vec<f64> {
        self.layer(self.last_layer()).iter().map(|n| n.activation).collect()
    }

    /// Completed training cycles.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Completed training cycles whose output argmax matched the target's.
    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Sum of every completed cycle's cost.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Assigns an input node's activation directly.
    ///
    /// Computed nodes only get their activation from the forward pass; asking
    /// to set one is reported and leaves the node untouched. Ids from another
    /// instance that fall outside this one fail with `UnknownNode`.
    pub fn set_activation(&mut self, id: NodeId, value: f64) -> Result<()> {
        let node_count = self.nodes.len();
        let node = self.nodes.get_mut(id.0)
            .ok_or(NnError::UnknownNode { node: id.0, node_count })?;
        if !node.is_input() {
            warn!("refusing to set the activation of node {} in layer {}", id.0, node.layer);
            return Err(NnError::ActivationMisuse { node: id.0, layer: node.layer });
        }
        node.activation = value;
        Ok(())
    }

    /// Copies every weight (connection-id order) and every computed node's
    /// bias (node-id order).
    pub fn parameters(&self) -> Parameters {
        let weights = self.connections.iter().map(|c| c.weight).collect();
        let biases = self.computed_nodes().iter().map(|n| n.bias).collect();
        Parameters::new(weights, biases)
    }

    /// Replaces every weight and bias positionally. Nothing is written unless
    /// the counts match the topology.
    pub fn load_parameters(&mut self, parameters: &Parameters) -> Result<()> {
        parameters.check_fits(&self.topology)?;
        self.write_parameters(&parameters.weights, &parameters.biases);
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Callers must have checked both lengths.
    pub(crate) fn write_parameters(&mut self, weights: &[f64], biases: &[f64]) {
        for (connection, &w) in self.connections.iter_mut().zip(weights) {
            connection.weight = w;
        }
        let first_computed = self.topology.input_count;
        for (node, &b) in self.nodes[first_computed..].iter_mut().zip(biases) {
            node.bias = b;
        }
    }

    fn computed_nodes(&self) -> &[Node] {
        &self.nodes[self.topology.input_count..]
    }
}

/// Reserves room for `count` arena entries; a failed allocation is a
/// configuration error.
fn reserve<T>(arena: &mut Vec<T>, count: usize, what: &str) -> Result<()> {
    arena.try_reserve_exact(count).map_err(|e| {
        NnError::configuration(format!("cannot allocate {count} {what}: {e}"))
    })
}
