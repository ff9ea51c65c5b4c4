use std::collections::BTreeMap;

use crate::monitor::monitor::Monitor;

/// In-memory monitor keeping every point it was sent.
#[derive(Debug, Default, Clone)]
pub struct CostHistory {
    lines: BTreeMap<usize, Vec<f64>>,
    learning_rates: BTreeMap<usize, f64>,
}

impl CostHistory {
    pub fn new() -> CostHistory {
        CostHistory::default()
    }

    /// Points of one line, oldest first.
    pub fn line(&self, line_id: usize) -> &[f64] {
        self.lines.get(&line_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn line_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.keys().copied()
    }

    pub fn learning_rate(&self, line_id: usize) -> Option<f64> {
        self.learning_rates.get(&line_id).copied()
    }

    /// Smallest and largest value across every line, for axis scaling.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.lines.values().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

impl Monitor for CostHistory {
    fn add_data_point(&mut self, line_id: usize, value: f64) {
        self.lines.entry(line_id).or_default().push(value);
    }

    fn set_learning_rate(&mut self, line_id: usize, learning_rate: f64) {
        self.learning_rates.insert(line_id, learning_rate);
    }
}
