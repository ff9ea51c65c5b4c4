use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Serialize, Deserialize};

use crate::network::backprop::Cycle;

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, Default)]
struct ReplicaTally {
    cycles: usize,
    skipped: usize,
    correct: usize,
    cost: f64,
}

/// Cost accumulated by every replica since the last report.
///
/// Workers record into it after each finished cycle; the coordinator drains
/// it with [`CostWindow::take`].
#[derive(Debug, Clone)]
pub struct CostWindow {
    tallies: Vec<ReplicaTally>,
}

impl CostWindow {
    pub fn new(replicas: usize) -> CostWindow {
        CostWindow { tallies: vec![ReplicaTally::default(); replicas] }
    }

    pub fn record(&mut self, replica: usize, cycle: &Cycle) {
        if let Some(tally) = self.tallies.get_mut(replica) {
            tally.cycles += 1;
            tally.cost += cycle.cost;
            if cycle.correct {
                tally.correct += 1;
            }
        }
    }

    pub fn record_skip(&mut self, replica: usize) {
        if let Some(tally) = self.tallies.get_mut(replica) {
            tally.skipped += 1;
        }
    }

    /// Completed cycles across all replicas since the last report.
    pub fn cycles(&self) -> usize {
        self.tallies.iter().map(|t| t.cycles).sum()
    }

    /// Builds a report and starts a fresh window.
    pub fn take(&mut self, learning_rates: &[f64]) -> CostReport {
        let replicas: Vec<ReplicaCost> = self.tallies.iter()
            .enumerate()
            .map(|(replica, tally)| ReplicaCost {
                replica,
                cycles: tally.cycles,
                skipped: tally.skipped,
                total_cost: tally.cost,
                mean_cost: if tally.cycles == 0 { 0.0 } else { tally.cost / tally.cycles as f64 },
                accuracy: if tally.cycles == 0 { None } else { Some(tally.correct as f64 / tally.cycles as f64) },
                learning_rate: learning_rates.get(replica).copied().unwrap_or(0.0),
            })
            .collect();

        for tally in &mut self.tallies {
            *tally = ReplicaTally::default();
        }

        CostReport {
            cycles: replicas.iter().map(|r| r.cycles).sum(),
            total_cost: replicas.iter().map(|r| r.total_cost).sum(),
            replicas,
        }
    }
}

/// One replica's share of a [`CostReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaCost {
    pub replica: usize,
    /// Completed cycles in the window.
    pub cycles: usize,
    /// Cycles skipped because of a per-replica error.
    pub skipped: usize,
    pub total_cost: f64,
    /// `total_cost / cycles`, or 0 for an empty window.
    pub mean_cost: f64,
    /// Fraction of cycles whose output argmax matched the target.
    pub accuracy: Option<f64>,
    pub learning_rate: f64,
}

/// Aggregate output-layer error over one reporting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub cycles: usize,
    pub total_cost: f64,
    pub replicas: Vec<ReplicaCost>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_reports_and_resets() {
        let mut window = CostWindow::new(2);
        window.record(0, &Cycle { cost: 1.0, correct: true });
        window.record(0, &Cycle { cost: 3.0, correct: false });
        window.record(1, &Cycle { cost: 0.5, correct: true });
        window.record_skip(1);
        assert_eq!(window.cycles(), 3);

        let report = window.take(&[0.1, 0.2]);
        assert_eq!(report.cycles, 3);
        assert!((report.total_cost - 4.5).abs() < 1e-12);
        assert_eq!(report.replicas[0].mean_cost, 2.0);
        assert_eq!(report.replicas[0].accuracy, Some(0.5));
        assert_eq!(report.replicas[1].skipped, 1);
        assert_eq!(report.replicas[1].learning_rate, 0.2);

        let empty = window.take(&[0.1, 0.2]);
        assert_eq!(empty.cycles, 0);
        assert_eq!(empty.replicas[0].accuracy, None);
        assert_eq!(empty.replicas[0].mean_cost, 0.0);
    }

    #[test]
    fn unknown_replicas_are_ignored() {
        let mut window = CostWindow::new(1);
        window.record(5, &Cycle { cost: 1.0, correct: true });
        window.record_skip(5);
        assert_eq!(window.cycles(), 0);
    }
}
