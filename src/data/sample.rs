use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};

/// One labelled sample as handed over by a sample source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub input: Vec<f64>,
    /// Class index in `[0, output_count)`.
    pub label: usize,
}

impl Sample {
    pub fn new(input: Vec<f64>, label: usize) -> Sample {
        Sample { input, label }
    }
}

/// What a training cycle should drive the output layer towards.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A class index, expanded to a one-hot vector by the replica.
    Label(usize),
    /// An explicit target vector.
    Dense(Vec<f64>),
}

impl Target {
    /// The dense target vector for an output layer of `output_count` nodes.
    pub fn resolve(&self, output_count: usize) -> Result<Vec<f64>> {
        match self {
            Target::Label(label) => one_hot(*label, output_count),
            Target::Dense(values) => Ok(values.clone()),
        }
    }
}

/// `output_count` zeros with a 1.0 at `label`.
pub fn one_hot(label: usize, output_count: usize) -> Result<Vec<f64>> {
    if label >= output_count {
        return Err(NnError::InputShape { what: "label", got: label, expected: output_count });
    }
    let mut target = vec![0.0; output_count];
    target[label] = 1.0;
    Ok(target)
}

/// Anything that can keep handing out samples. Returning `None` ends training.
pub trait SampleSource {
    fn next_sample(&mut self) -> Option<Sample>;
}

impl<I: Iterator<Item = Sample>> SampleSource for I {
    fn next_sample(&mut self) -> Option<Sample> {
        self.next()
    }
}

/// Endless source drawing uniformly, with replacement, from an in-memory set.
pub struct RandomSampler<R: Rng> {
    samples: Vec<Sample>,
    rng: R,
}

impl<R: Rng> RandomSampler<R> {
    pub fn new(samples: Vec<Sample>, rng: R) -> RandomSampler<R> {
        RandomSampler { samples, rng }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl<R: Rng> Iterator for RandomSampler<R> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..self.len());
        Some(self.samples[index].clone())
    }
}
