use serde::{Serialize, Deserialize};
use crate::graph::connection::ConnectionId;

/// Index of a node inside its instance's arena. Nodes are stored layer by
/// layer, so ids ascend with the layer index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// A single neuron.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) layer: usize,
    pub(crate) bias: f64,
    /// Weighted sum over backward connections, before the bias is applied.
    pub(crate) pre_activation: f64,
    pub(crate) activation: f64,
    pub(crate) error: f64,
    pub(crate) forward: Vec<ConnectionId>,
    pub(crate) backward: Vec<ConnectionId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, layer: usize, bias: f64) -> Node {
        Node {
            id,
            layer,
            bias,
            pre_activation: 0.0,
            activation: 0.0,
            error: 0.0,
            forward: Vec::new(),
            backward: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn is_input(&self) -> bool {
        self.layer == 0
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn pre_activation(&self) -> f64 {
        self.pre_activation
    }

    /// The argument the activation function is evaluated on.
    pub fn net_input(&self) -> f64 {
        self.pre_activation - self.bias
    }

    pub fn activation(&self) -> f64 {
        self.activation
    }

    /// Error term of the last backward pass. Only meaningful once the
    /// owning network has completed `backward` for the current sample.
    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn forward_connections(&self) -> &[ConnectionId] {
        &self.forward
    }

    pub fn backward_connections(&self) -> &[ConnectionId] {
        &self.backward
    }
}
