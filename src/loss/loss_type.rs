use serde::{Serialize, Deserialize};

use crate::loss::bce::BceLoss;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::math::matrix::Matrix;

/// Selects which loss function the training loop uses.
///
/// - `CrossEntropy`       — Categorical cross-entropy; pair with Softmax output.
///   The gradient is the combined Softmax+CE gradient (predicted - expected).
/// - `BinaryCrossEntropy` — Binary cross-entropy; pair with a single Sigmoid output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    CrossEntropy,
    BinaryCrossEntropy,
}

impl LossType {
    pub fn loss(&self, predicted: &Matrix, expected: &Matrix) -> f64 {
        match self {
            LossType::CrossEntropy => CrossEntropyLoss::loss(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss::loss(predicted, expected),
        }
    }

    pub fn derivative(&self, predicted: &Matrix, expected: &Matrix) -> Matrix {
        match self {
            LossType::CrossEntropy => CrossEntropyLoss::derivative(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss::derivative(predicted, expected),
        }
    }
}

/// How per-sample losses are folded into one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    #[default]
    Mean,
    Sum,
}

/// Running loss total for one epoch.
#[derive(Debug, Clone, Default)]
pub struct LossTracker {
    sum: f64,
    reduction: Reduction,
}

impl LossTracker {
    pub fn new(reduction: Reduction) -> LossTracker {
        LossTracker { sum: 0.0, reduction }
    }

    pub fn reset(&mut self) {
        self.sum = 0.0;
    }

    pub fn add(&mut self, loss: f64) {
        self.sum += loss;
    }

    /// Reduced loss over `count` samples. `Mean` over zero samples is NaN.
    pub fn result(&self, count: usize) -> f64 {
        match self.reduction {
            Reduction::Mean => self.sum / count as f64,
            Reduction::Sum => self.sum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_and_sum_reductions() {
        let mut mean = LossTracker::new(Reduction::Mean);
        let mut sum = LossTracker::new(Reduction::Sum);
        for l in [1.0, 2.0, 3.0] {
            mean.add(l);
            sum.add(l);
        }
        assert_relative_eq!(mean.result(3), 2.0);
        assert_relative_eq!(sum.result(3), 6.0);

        mean.reset();
        assert_relative_eq!(mean.result(1), 0.0);
    }

    #[test]
    fn dispatches_on_loss_type() {
        let p = Matrix::column(&[0.8, 0.2]);
        let t = Matrix::column(&[1.0, 0.0]);
        assert_relative_eq!(
            LossType::CrossEntropy.loss(&p, &t),
            CrossEntropyLoss::loss(&p, &t)
        );
        assert_eq!(LossType::BinaryCrossEntropy.derivative(&p, &t).data[0], p.data[0] - 1.0);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&LossType::BinaryCrossEntropy).unwrap();
        assert_eq!(json, "\"binary_cross_entropy\"");
    }
}
