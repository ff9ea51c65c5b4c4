pub mod param_file;
pub mod parameters;

pub use param_file::{read_stream, write_stream, ParameterStore, Snapshot};
pub use parameters::Parameters;
