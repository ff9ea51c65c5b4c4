pub mod connection;
pub mod node;
pub mod topology;

pub use connection::{Connection, ConnectionId};
pub use node::{Node, NodeId};
pub use topology::Topology;
