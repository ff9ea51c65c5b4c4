pub mod activation;
pub mod data;
pub mod error;
pub mod graph;
pub mod monitor;
pub mod network;
pub mod persist;
pub mod train;

// Convenience re-exports
pub use activation::{ActivationFunction, ActivationScheme};
pub use data::{one_hot, RandomSampler, Sample, SampleSource, Target};
pub use error::{NnError, Result};
pub use graph::{Connection, ConnectionId, Node, NodeId, Topology};
pub use monitor::{CostHistory, LogMonitor, Monitor, SharedMonitor};
pub use network::{Cycle, Network, ParameterUpdate};
pub use persist::{ParameterStore, Parameters, Snapshot};
pub use train::{
    train_loop, Coordinator, CoordinatorConfig, CostReport, ReplicaOutcome, StepReport, TrainConfig,
};
