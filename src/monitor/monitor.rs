use std::sync::{Arc, Mutex};

use log::info;

/// Consumer of training progress, e.g. a chart with one line per replica.
///
/// A monitor only receives data; nothing it does feeds back into training.
pub trait Monitor: Send {
    /// Appends `value` to line `line_id`.
    fn add_data_point(&mut self, line_id: usize, value: f64);

    /// Annotates line `line_id` with the learning rate it trains at.
    fn set_learning_rate(&mut self, line_id: usize, learning_rate: f64);
}

/// A monitor shared between the coordinator and whoever renders it. The
/// mutex serializes every push.
pub type SharedMonitor = Arc<Mutex<dyn Monitor>>;

/// Forwards every point to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMonitor;

impl Monitor for LogMonitor {
    fn add_data_point(&mut self, line_id: usize, value: f64) {
        info!("line {line_id}: cost {value:.4}");
    }

    fn set_learning_rate(&mut self, line_id: usize, learning_rate: f64) {
        info!("line {line_id}: LR = {learning_rate:.2}");
    }
}
