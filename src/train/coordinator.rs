use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};

use crate::data::sample::{Sample, Target};
use crate::error::{NnError, Result};
use crate::graph::topology::Topology;
use crate::monitor::monitor::SharedMonitor;
use crate::network::backprop::Cycle;
use crate::persist::param_file::{ParameterStore, Snapshot};
use crate::persist::parameters::Parameters;
use crate::train::cost_window::{lock, CostReport, CostWindow};
use crate::train::train_config::CoordinatorConfig;
use crate::train::worker::{Job, ReplicaStats, Worker};

/// What happened to one replica during a train step.
#[derive(Debug)]
pub enum ReplicaOutcome {
    Trained(Cycle),
    /// The cycle failed before committing; the replica's parameters are unchanged.
    Skipped(NnError),
}

/// Result of one train step across every replica, in replica order.
#[derive(Debug)]
pub struct StepReport {
    pub step: usize,
    pub outcomes: Vec<ReplicaOutcome>,
}

impl StepReport {
    /// Summed cost of every replica that trained.
    pub fn total_cost(&self) -> f64 {
        self.outcomes.iter()
            .filter_map(|o| match o {
                ReplicaOutcome::Trained(cycle) => Some(cycle.cost),
                ReplicaOutcome::Skipped(_) => None,
            })
            .sum()
    }

    pub fn trained(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o, ReplicaOutcome::Trained(_))).count()
    }

    /// Replica indices whose cycle was skipped.
    pub fn skipped(&self) -> Vec<usize> {
        self.outcomes.iter()
            .enumerate()
            .filter(|(_, o)| matches!(o, ReplicaOutcome::Skipped(_)))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Trains K independent replicas of one network concurrently.
///
/// Each replica is built and exclusively owned by its own worker thread,
/// spawned once and reused for every step. A step dispatches one cycle per
/// replica and returns only after all of them finished (or were skipped).
pub struct Coordinator {
    config: CoordinatorConfig,
    workers: Vec<Worker>,
    learning_rates: Vec<f64>,
    window: Arc<Mutex<CostWindow>>,
    monitor: Option<SharedMonitor>,
    stop_flag: Arc<AtomicBool>,
    steps: usize,
}

impl Coordinator {
    /// Spawns one worker per replica and waits until every replica is built.
    pub fn new(config: CoordinatorConfig) -> Result<Coordinator> {
        config.validate()?;

        let window = Arc::new(Mutex::new(CostWindow::new(config.replicas)));
        let (ready_tx, ready_rx) = mpsc::channel();
        let mut workers = Vec::with_capacity(config.replicas);
        for replica in 0..config.replicas {
            workers.push(Worker::spawn(
                replica,
                config.topology,
                config.scheme,
                config.seed,
                Arc::clone(&window),
                ready_tx.clone(),
            )?);
        }
        drop(ready_tx);
        let mut reported = vec![false; config.replicas];
        for (replica, built) in ready_rx.iter() {
            built?;
            reported[replica] = true;
        }
        if let Some(replica) = reported.iter().position(|&ok| !ok) {
            warn!("replica {replica} died before reporting its build");
            return Err(NnError::WorkerLost { replica });
        }

        let mut coordinator = Coordinator {
            learning_rates: config.learning_rates(),
            config,
            workers,
            window,
            monitor: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            steps: 0,
        };

        if coordinator.config.shared_init && coordinator.replicas() > 1 {
            let initial = coordinator.export_parameters()?.swap_remove(0);
            coordinator.import_parameters(&[initial])?;
        }

        info!(
            "coordinator ready: {} replicas of {:?}, learning rates {:?}",
            coordinator.replicas(),
            coordinator.config.topology,
            coordinator.learning_rates
        );
        Ok(coordinator)
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.config.topology
    }

    pub fn replicas(&self) -> usize {
        self.workers.len()
    }

    /// Train steps dispatched so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn learning_rates(&self) -> &[f64] {
        &self.learning_rates
    }

    /// Changes one replica's learning rate from the next step on.
    pub fn set_learning_rate(&mut self, replica: usize, learning_rate: f64) -> Result<()> {
        let replicas = self.replicas();
        let slot = self.learning_rates.get_mut(replica).ok_or(NnError::InputShape {
            what: "replica index",
            got: replica,
            expected: replicas,
        })?;
        *slot = learning_rate;
        if let Some(monitor) = &self.monitor {
            lock(monitor).set_learning_rate(replica, learning_rate);
        }
        Ok(())
    }

    /// Flag checked before every step; raising it makes later steps fail
    /// with [`NnError::Stopped`]. A step already running always completes.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }

    /// Sends every point of future reports to `monitor` and annotates each
    /// replica's line with its learning rate.
    pub fn attach_monitor(&mut self, monitor: SharedMonitor) {
        {
            let mut sink = lock(&monitor);
            for (replica, &rate) in self.learning_rates.iter().enumerate() {
                sink.set_learning_rate(replica, rate);
            }
        }
        self.monitor = Some(monitor);
    }

    /// Trains every replica on the same input and dense target.
    pub fn train_step(&mut self, input: &[f64], target: &[f64]) -> Result<StepReport> {
        let input: Arc<[f64]> = Arc::from(input);
        let target = Arc::new(Target::Dense(target.to_vec()));
        self.dispatch_step(|_| (Arc::clone(&input), Arc::clone(&target)))
    }

    /// Trains every replica on a labelled sample; each replica derives the
    /// one-hot target itself.
    pub fn train_sample(&mut self, sample: &Sample) -> Result<StepReport> {
        let input: Arc<[f64]> = Arc::from(sample.input.as_slice());
        let target = Arc::new(Target::Label(sample.label));
        self.dispatch_step(|_| (Arc::clone(&input), Arc::clone(&target)))
    }

    /// Trains replica `i` on `samples[i]`.
    pub fn train_step_each(&mut self, samples: Vec<(Vec<f64>, Target)>) -> Result<StepReport> {
        if samples.len() != self.replicas() {
            return Err(NnError::InputShape {
                what: "replica samples",
                got: samples.len(),
                expected: self.replicas(),
            });
        }
        let samples: Vec<(Arc<[f64]>, Arc<Target>)> = samples.into_iter()
            .map(|(input, target)| (Arc::from(input), Arc::new(target)))
            .collect();
        self.dispatch_step(|replica| (Arc::clone(&samples[replica].0), Arc::clone(&samples[replica].1)))
    }

    fn dispatch_step<F>(&mut self, sample_for: F) -> Result<StepReport>
    where
        F: Fn(usize) -> (Arc<[f64]>, Arc<Target>),
    {
        if self.is_stopped() {
            return Err(NnError::Stopped);
        }

        let learning_rates = self.learning_rates.clone();
        let results = self.round(|replica, reply| {
            let (input, target) = sample_for(replica);
            Job::Train { input, target, learning_rate: learning_rates[replica], reply }
        })?;

        self.steps += 1;
        let outcomes = results.into_iter()
            .enumerate()
            .map(|(replica, result)| match result {
                Ok(cycle) => ReplicaOutcome::Trained(cycle),
                Err(e) => {
                    warn!("replica {replica} skipped step {}: {e}", self.steps);
                    ReplicaOutcome::Skipped(e)
                }
            })
            .collect();

        Ok(StepReport { step: self.steps, outcomes })
    }

    /// Drains the cost window, logs it and forwards it to the monitor.
    /// Cycles completed across all replicas since the last cost report.
    pub fn pending_cycles(&self) -> usize {
        lock(&self.window).cycles()
    }

    pub fn report_cost(&self) -> CostReport {
        let report = lock(&self.window).take(&self.learning_rates);

        info!("{} cycles, total cost {:.4}", report.cycles, report.total_cost);
        for replica in &report.replicas {
            info!(
                "  replica {} (LR = {:.2}): mean cost {:.4} over {} cycles, {} skipped",
                replica.replica, replica.learning_rate, replica.mean_cost, replica.cycles, replica.skipped
            );
        }

        if let Some(monitor) = &self.monitor {
            let mut sink = lock(monitor);
            for replica in report.replicas.iter().filter(|r| r.cycles > 0) {
                sink.add_data_point(replica.replica, replica.mean_cost);
                sink.set_learning_rate(replica.replica, replica.learning_rate);
            }
        }
        report
    }

    /// Forward pass of `input` on every replica.
    pub fn evaluate(&self, input: &[f64]) -> Result<Vec<Result<Vec<f64>>>> {
        let input: Arc<[f64]> = Arc::from(input);
        self.round(|_, reply| Job::Evaluate { input: Arc::clone(&input), reply })
    }

    pub fn replica_stats(&self) -> Result<Vec<ReplicaStats>> {
        self.round(|_, reply| Job::Stats { reply })
    }

    /// Every replica's weights and biases, replica 0 first.
    pub fn export_parameters(&self) -> Result<Vec<Parameters>> {
        self.round(|_, reply| Job::Export { reply })
    }

    /// Loads one parameter set per replica, or a single set into all of them.
    ///
    /// Every set is checked against the topology before any replica changes.
    pub fn import_parameters(&self, parameters: &[Parameters]) -> Result<()> {
        if parameters.len() != 1 && parameters.len() != self.replicas() {
            return Err(NnError::persistence(format!(
                "{} parameter sets cannot be spread over {} replicas",
                parameters.len(),
                self.replicas()
            )));
        }
        for set in parameters {
            set.check_fits(self.topology())?;
        }

        let shared: Vec<Arc<Parameters>> = parameters.iter().cloned().map(Arc::new).collect();
        let results = self.round(|replica, reply| {
            let set = if shared.len() == 1 { &shared[0] } else { &shared[replica] };
            Job::Import { parameters: Arc::clone(set), reply }
        })?;
        results.into_iter().collect()
    }

    /// Writes `replica-<i>-weights.bin` and `replica-<i>-biases.bin` for every
    /// replica into `dir`.
    pub fn save_parameters(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        for (replica, parameters) in self.export_parameters()?.iter().enumerate() {
            ParameterStore::for_replica(dir, replica).save(parameters)?;
        }
        Ok(())
    }

    /// Reads the files written by [`Coordinator::save_parameters`]. All files
    /// are read and checked before any replica changes.
    pub fn load_parameters(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        let parameters = (0..self.replicas())
            .map(|replica| ParameterStore::for_replica(dir, replica).load(self.topology()))
            .collect::<Result<Vec<_>>>()?;
        self.import_parameters(&parameters)?;
        info!("loaded parameters of {} replicas from {}", parameters.len(), dir.display());
        Ok(())
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            topology: self.config.topology,
            scheme: self.config.scheme,
            replicas: self.export_parameters()?,
        })
    }

    pub fn restore(&self, snapshot: &Snapshot) -> Result<()> {
        if snapshot.topology != self.config.topology || snapshot.scheme != self.config.scheme {
            return Err(NnError::persistence(format!(
                "snapshot of {:?} ({:?}) does not match {:?} ({:?})",
                snapshot.topology, snapshot.scheme, self.config.topology, self.config.scheme
            )));
        }
        self.import_parameters(&snapshot.replicas)
    }

    /// Sends one job per worker and blocks until every worker has answered
    /// or disappeared.
    fn round<T, F>(&self, mut job_for: F) -> Result<Vec<T>>
    where
        F: FnMut(usize, Sender<(usize, T)>) -> Job,
    {
        let (tx, rx) = mpsc::channel();
        for worker in &self.workers {
            worker.send(job_for(worker.replica, tx.clone()))?;
        }
        drop(tx);

        let mut slots: Vec<Option<T>> = (0..self.workers.len()).map(|_| None).collect();
        for (replica, value) in rx {
            if let Some(slot) = slots.get_mut(replica) {
                *slot = Some(value);
            }
        }
        slots.into_iter()
            .enumerate()
            .map(|(replica, slot)| slot.ok_or(NnError::WorkerLost { replica }))
            .collect()
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        debug!("shutting down {} workers after {} steps", self.workers.len(), self.steps);
    }
}
