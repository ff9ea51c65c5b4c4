use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activation::ActivationScheme;
use crate::data::sample::Target;
use crate::error::{NnError, Result};
use crate::graph::topology::Topology;
use crate::network::backprop::Cycle;
use crate::network::network::Network;
use crate::persist::parameters::Parameters;
use crate::train::cost_window::{lock, CostWindow};

/// Counters a replica keeps over its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplicaStats {
    pub runs: usize,
    pub correct: usize,
    pub total_cost: f64,
}

/// Reply channel of a job: every answer is tagged with the replica index.
pub(crate) type Reply<T> = Sender<(usize, T)>;

/// Work a coordinator hands to a replica's thread.
pub(crate) enum Job {
    Train {
        input: Arc<[f64]>,
        target: Arc<Target>,
        learning_rate: f64,
        reply: Reply<Result<Cycle>>,
    },
    Evaluate {
        input: Arc<[f64]>,
        reply: Reply<Result<Vec<f64>>>,
    },
    Export {
        reply: Reply<Parameters>,
    },
    Import {
        parameters: Arc<Parameters>,
        reply: Reply<Result<()>>,
    },
    Stats {
        reply: Reply<ReplicaStats>,
    },
}

/// Handle on one long-lived thread that exclusively owns one replica.
///
/// Dropping the handle closes the job queue and joins the thread.
pub(crate) struct Worker {
    pub(crate) replica: usize,
    jobs: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns the thread, which builds its own replica and reports the build
    /// result on `ready` before serving jobs.
    pub(crate) fn spawn(
        replica: usize,
        topology: Topology,
        scheme: ActivationScheme,
        seed: Option<u64>,
        window: Arc<Mutex<CostWindow>>,
        ready: Reply<Result<()>>,
    ) -> Result<Worker> {
        let (jobs, queue) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(format!("replica-{replica}"))
            .spawn(move || {
                let built = match seed {
                    Some(seed) => {
                        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(replica as u64));
                        Network::build(topology, scheme, &mut rng)
                    }
                    None => Network::new(topology, scheme),
                };
                match built {
                    Ok(network) => {
                        let _ = ready.send((replica, Ok(())));
                        drop(ready);
                        serve(replica, network, queue, window);
                    }
                    Err(e) => {
                        let _ = ready.send((replica, Err(e)));
                    }
                }
            })?;

        Ok(Worker { replica, jobs: Some(jobs), handle: Some(handle) })
    }

    pub(crate) fn send(&self, job: Job) -> Result<()> {
        self.jobs.as_ref()
            .and_then(|jobs| jobs.send(job).ok())
            .ok_or(NnError::WorkerLost { replica: self.replica })
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("worker of replica {} panicked", self.replica);
            }
        }
    }
}

/// Job loop of one replica; returns once the queue is closed.
fn serve(replica: usize, mut network: Network, queue: Receiver<Job>, window: Arc<Mutex<CostWindow>>) {
    let output_count = network.topology().output_count;
    for job in queue {
        match job {
            Job::Train { input, target, learning_rate, reply } => {
                let outcome = target.resolve(output_count)
                    .and_then(|target| network.train_cycle(&input, &target, learning_rate));
                {
                    let mut window = lock(&window);
                    match &outcome {
                        Ok(cycle) => window.record(replica, cycle),
                        Err(_) => window.record_skip(replica),
                    }
                }
                let _ = reply.send((replica, outcome));
            }
            Job::Evaluate { input, reply } => {
                let _ = reply.send((replica, network.forward(&input)));
            }
            Job::Export { reply } => {
                let _ = reply.send((replica, network.parameters()));
            }
            Job::Import { parameters, reply } => {
                let _ = reply.send((replica, network.load_parameters(&parameters)));
            }
            Job::Stats { reply } => {
                let stats = ReplicaStats {
                    runs: network.runs(),
                    correct: network.correct(),
                    total_cost: network.total_cost(),
                };
                let _ = reply.send((replica, stats));
            }
        }
    }
    debug!("replica {replica} shutting down after {} runs", network.runs());
}
