use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;

/// Per-instance choice of activation functions, fixed at construction.
///
/// - `Logistic`  — every computed layer is logistic.
/// - `LeakyTanh` — hidden layers use the leaky rectifier, the output layer
///   uses the hyperbolic tangent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationScheme {
    #[default]
    Logistic,
    LeakyTanh,
}

impl ActivationScheme {
    pub fn hidden(&self) -> ActivationFunction {
        match self {
            ActivationScheme::Logistic => ActivationFunction::Sigmoid,
            ActivationScheme::LeakyTanh => ActivationFunction::leaky(),
        }
    }

    pub fn output(&self) -> ActivationFunction {
        match self {
            ActivationScheme::Logistic => ActivationFunction::Sigmoid,
            ActivationScheme::LeakyTanh => ActivationFunction::Tanh,
        }
    }

    /// Activation used by `layer` in a network whose output layer is `last_layer`.
    /// Layer 0 has no activation function; callers never evaluate it.
    pub fn for_layer(&self, layer: usize, last_layer: usize) -> ActivationFunction {
        if layer == last_layer { self.output() } else { self.hidden() }
    }
}
