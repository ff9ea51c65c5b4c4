pub mod activation;
pub mod scheme;

pub use activation::ActivationFunction;
pub use scheme::ActivationScheme;
