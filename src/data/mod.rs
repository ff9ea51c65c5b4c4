pub mod sample;

pub use sample::{one_hot, RandomSampler, Sample, SampleSource, Target};
