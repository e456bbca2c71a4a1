use serde::{Serialize, Deserialize};
use std::f64::consts::E;

use crate::math::matrix::Matrix;

/// Activation applied after a dense layer's linear transform.
///
/// Every `derivative` here receives the *activated* output `a = f(y)`, not the
/// pre-activation `y`. The backward pass only keeps activations around, so
/// each derivative is expressed in terms of `a`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    Sigmoid,
    /// Vector-valued; normalizes the whole column rather than each entry.
    Softmax,
    Tanh,
    ReLU,
    Identity,
}

impl Activation {
    /// Element-wise activation. `Softmax` is handled in `activate` since it
    /// depends on the whole vector.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            Activation::Softmax => {
                panic!("Activation::Softmax::function() must not be called directly; \
                        use Activation::activate() which applies the full-vector softmax.")
            }
            Activation::Tanh => x.tanh(),
            Activation::ReLU => if x > 0.0 { x } else { 0.0 },
            Activation::Identity => x,
        }
    }

    /// Derivative with respect to the pre-activation, given the activated value `a`.
    ///
    /// For `Softmax` only the Jacobian diagonal `a·(1−a)` is returned. Paired
    /// with categorical cross-entropy, whose derivative is already
    /// `prediction − target`, this is the behavior training relies on; it is
    /// not a general softmax gradient.
    pub fn derivative_at(&self, a: f64) -> f64 {
        match self {
            Activation::Sigmoid | Activation::Softmax => a * (1.0 - a),
            Activation::Tanh => 1.0 - a * a,
            Activation::ReLU => if a > 0.0 { 1.0 } else { 0.0 },
            Activation::Identity => 1.0,
        }
    }

    pub fn activate(&self, y: &Matrix) -> Matrix {
        match self {
            Activation::Softmax => softmax(y),
            _ => y.map(|x| self.function(x)),
        }
    }

    pub fn derivative(&self, activated: &Matrix) -> Matrix {
        activated.map(|a| self.derivative_at(a))
    }
}

/// `e^x_i / Σ e^x_j`, shifted by the max entry to keep `exp` finite.
fn softmax(y: &Matrix) -> Matrix {
    let max = y.max();
    let exps = y.map(|x| (x - max).exp());
    let sum: f64 = exps.data.iter().sum();
    exps.map(|x| x / sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sigmoid_derivative_takes_activated_value() {
        let y = Matrix::column(&[0.0, 2.0]);
        let a = Activation::Sigmoid.activate(&y);
        assert_relative_eq!(a.data[0], 0.5);
        let d = Activation::Sigmoid.derivative(&a);
        assert_relative_eq!(d.data[0], 0.25);
        let s = 1.0 / (1.0 + (-2.0f64).exp());
        assert_relative_eq!(d.data[1], s * (1.0 - s), epsilon = 1e-12);
    }

    #[test]
    fn softmax_sums_to_one_and_survives_large_logits() {
        let y = Matrix::column(&[1000.0, 1001.0, 999.0]);
        let a = Activation::Softmax.activate(&y);
        assert_relative_eq!(a.data.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(a.data[1] > a.data[0] && a.data[0] > a.data[2]);
    }

    #[test]
    fn softmax_derivative_is_jacobian_diagonal() {
        let a = Matrix::column(&[0.2, 0.8]);
        let d = Activation::Softmax.derivative(&a);
        assert_relative_eq!(d.data[0], 0.16, epsilon = 1e-12);
        assert_relative_eq!(d.data[1], 0.16, epsilon = 1e-12);
    }

    #[test]
    fn tanh_and_relu_derivatives() {
        let a = Activation::Tanh.activate(&Matrix::column(&[0.5]));
        let d = Activation::Tanh.derivative(&a);
        assert_relative_eq!(d.data[0], 1.0 - 0.5f64.tanh().powi(2), epsilon = 1e-12);

        let r = Activation::ReLU.activate(&Matrix::column(&[-1.0, 3.0]));
        assert_eq!(r.data, vec![0.0, 3.0]);
        assert_eq!(Activation::ReLU.derivative(&r).data, vec![0.0, 1.0]);
    }
}
