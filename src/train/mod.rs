pub mod coordinator;
pub mod cost_window;
pub mod loop_fn;
pub mod train_config;
pub mod worker;

pub use coordinator::{Coordinator, ReplicaOutcome, StepReport};
pub use cost_window::{CostReport, CostWindow, ReplicaCost};
pub use loop_fn::train_loop;
pub use train_config::{CoordinatorConfig, TrainConfig};
pub use worker::ReplicaStats;
