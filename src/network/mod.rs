pub mod backprop;
pub mod forward;
pub mod network;

pub use backprop::{Cycle, ParameterUpdate};
pub use forward::argmax;
pub use network::Network;
