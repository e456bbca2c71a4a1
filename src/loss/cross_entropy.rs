use crate::math::matrix::Matrix;

/// Categorical cross-entropy loss for use with a Softmax output layer.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Computes `-Σ expected[k] · log(softmax(predicted)[k])`.
    ///
    /// The softmax is taken in log space: the max logit is subtracted before
    /// exponentiating, so `log_softmax = predicted - max - log_sum_exp` never
    /// overflows. Classes with a zero target contribute nothing.
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> f64 {
        let max = predicted.max();
        let log_sum_exp = predicted.data.iter()
            .map(|p| (p - max).exp())
            .sum::<f64>()
            .ln();

        -predicted.data.iter().zip(expected.data.iter())
            .filter(|(_, e)| **e > 0.0)
            .map(|(p, e)| e * (p - max - log_sum_exp))
            .sum::<f64>()
    }

    /// Gradient of the combined Softmax + cross-entropy w.r.t. the output:
    ///   ∂L/∂z_i = predicted[i] - expected[i]
    ///
    /// Only valid when `predicted` is a softmax output and `expected` is
    /// one-hot; this is the initial delta of the backward pass.
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Matrix {
        predicted.clone() - expected.clone()
    }
}
