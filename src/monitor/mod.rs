pub mod history;
pub mod monitor;

pub use history::CostHistory;
pub use monitor::{LogMonitor, Monitor, SharedMonitor};
