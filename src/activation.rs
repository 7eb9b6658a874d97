//! Scalar activation functions and their derivatives.

use ndarray::{Array, ArrayBase, Data, Dimension};

/// σ(z) = 1 / (1 + e^-z), in (0, 1).
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + f64::exp(-z))
}

/// Derivative of the sigmoid, expressed in terms of its output `y = sigmoid(z)`.
pub fn sigmoid_derivative(y: f64) -> f64 {
    y * (1.0 - y)
}

pub fn relu(z: f64) -> f64 {
    z.max(0.0)
}

/// Derivative of ReLU, taking the original input. Zero at the kink.
pub fn relu_derivative(z: f64) -> f64 {
    if z > 0.0 { 1.0 } else { 0.0 }
}

/// Hyperbolic tangent, in (-1, 1).
pub fn tanh(z: f64) -> f64 {
    z.tanh()
}

/// Derivative of tanh in terms of its output `y = tanh(z)`.
pub fn tanh_derivative(y: f64) -> f64 {
    1.0 - y * y
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Sigmoid,
    Relu,
    Tanh,
}

impl Activation {
    pub fn apply(&self, z: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid(z),
            Activation::Relu => relu(z),
            Activation::Tanh => tanh(z),
        }
    }

    /// Derivative at `z`. Sigmoid and tanh derivatives are computed from the activated value, so
    /// this applies the function first for those two.
    pub fn derivative(&self, z: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid_derivative(sigmoid(z)),
            Activation::Relu => relu_derivative(z),
            Activation::Tanh => tanh_derivative(tanh(z)),
        }
    }

    /// Apply element-wise to an array of any dimension.
    pub fn apply_array<S, D>(&self, array: &ArrayBase<S, D>) -> Array<f64, D>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        array.mapv(|z| self.apply(z))
    }
}
