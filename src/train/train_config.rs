use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use serde::{Serialize, Deserialize};

use crate::activation::ActivationScheme;
use crate::error::{NnError, Result};
use crate::graph::topology::Topology;
use crate::train::cost_window::CostReport;

/// How a coordinator builds and trains its replicas.
///
/// # Fields
/// - `topology`           — shape shared by every replica
/// - `scheme`             — activation scheme shared by every replica
/// - `replicas`           — number of replicas (and worker threads)
/// - `learning_rate`      — rate of replica 0
/// - `learning_rate_step` — replica `i` trains at `learning_rate + i * step`;
///                          `0.0` gives every replica the same rate
/// - `shared_init`        — start every replica from replica 0's parameters
/// - `seed`               — replica `i` draws from `StdRng::seed_from_u64(seed + i)`;
///                          `None` uses the thread-local RNG
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    pub topology: Topology,
    #[serde(default)]
    pub scheme: ActivationScheme,
    #[serde(default = "default_replicas")]
    pub replicas: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub learning_rate_step: f64,
    #[serde(default = "default_shared_init")]
    pub shared_init: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_replicas() -> usize { 1 }
fn default_learning_rate() -> f64 { 0.1 }
fn default_shared_init() -> bool { true }

impl CoordinatorConfig {
    /// A single-replica logistic configuration with the default rate.
    pub fn new(topology: Topology) -> Self {
        CoordinatorConfig {
            topology,
            scheme: ActivationScheme::default(),
            replicas: default_replicas(),
            learning_rate: default_learning_rate(),
            learning_rate_step: 0.0,
            shared_init: default_shared_init(),
            seed: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.topology.validate()?;
        if self.replicas == 0 {
            return Err(NnError::configuration("a coordinator needs at least one replica"));
        }
        if let Some(replica) = self.learning_rates().iter().position(|r| !r.is_finite()) {
            return Err(NnError::configuration(format!("replica {replica} has a non-finite learning rate")));
        }
        Ok(())
    }

    /// Learning rate of every replica, replica 0 first.
    pub fn learning_rates(&self) -> Vec<f64> {
        (0..self.replicas)
            .map(|i| self.learning_rate + i as f64 * self.learning_rate_step)
            .collect()
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a config from a JSON file written by `save_json`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `steps`        — stop after this many train steps; `None` runs until the
///                    source is exhausted or the stop flag is raised
/// - `report_every` — steps between cost reports
/// - `progress_tx`  — optional channel sender; one `CostReport` is sent per
///                    report.  If the receiver is dropped the loop terminates
///                    early (clean shutdown).
/// - `stop_flag`    — optional atomic flag; when set to `true` from another
///                    thread the loop terminates after the current step.
pub struct TrainConfig {
    pub steps: Option<usize>,
    pub report_every: usize,
    pub progress_tx: Option<mpsc::Sender<CostReport>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel and no stop flag.
    pub fn new(steps: Option<usize>, report_every: usize) -> Self {
        TrainConfig {
            steps,
            report_every,
            progress_tx: None,
            stop_flag: None,
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::new(None, 100)
    }
}
