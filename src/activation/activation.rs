use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Logistic outputs smaller than this are flushed to exactly zero.
pub const SIGMOID_FLOOR: f64 = 0.000000001;

/// Slope used by the leaky rectifier below its threshold.
pub const LEAKY_SLOPE: f64 = 0.01;

/// Scalar activation functions a computed node can use.
///
/// Every node evaluates its function on the *net input*
/// `preActivation - bias`, where `preActivation` is the weighted sum over
/// its backward connections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    LeakyReLU { alpha: f64 },
    Tanh,
}

impl ActivationFunction {
    /// The leaky rectifier with the standard 0.01 slope.
    pub fn leaky() -> ActivationFunction {
        ActivationFunction::LeakyReLU { alpha: LEAKY_SLOPE }
    }

    /// Element-wise activation of a net input.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let y = 1.0 / (1.0 + E.powf(-x));
                if y < SIGMOID_FLOOR { 0.0 } else { y }
            }
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Tanh => x.tanh(),
        }
    }

    /// Derivative of the activation at a node.
    ///
    /// `net_input` is `preActivation - bias` and `activation` is the value
    /// `function(net_input)` produced during the forward pass. The logistic
    /// and hyperbolic forms are expressed through the stored activation, the
    /// rectifier through the sign of the net input.
    pub fn derivative(&self, net_input: f64, activation: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => activation * (1.0 - activation),
            ActivationFunction::LeakyReLU { alpha } => if net_input > 0.0 { 1.0 } else { *alpha },
            ActivationFunction::Tanh => 1.0 - activation * activation,
        }
    }
}
