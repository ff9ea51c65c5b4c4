use serde::{Serialize, Deserialize};
use crate::graph::node::NodeId;

/// Index of a connection inside its instance's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub usize);

/// Directed weighted edge from a node in layer L to a node in layer L+1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub(crate) id: ConnectionId,
    pub(crate) source: NodeId,
    pub(crate) destination: NodeId,
    pub(crate) weight: f64,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}
