use crate::math::matrix::Matrix;

/// Binary cross-entropy for a single sigmoid output.
pub struct BceLoss;

impl BceLoss {
    /// Scalar BCE on the first entry: -(y·ln(ŷ) + (1-y)·ln(1-ŷ))
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> f64 {
        let y = expected.data[0];
        let y_hat = predicted.data[0];
        -(y * y_hat.ln() + (1.0 - y) * (1.0 - y_hat).ln())
    }

    /// Combined Sigmoid + BCE gradient: predicted - expected
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Matrix {
        predicted.clone() - expected.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn loss_of_confident_correct_prediction_is_small() {
        let l = BceLoss::loss(&Matrix::column(&[0.99]), &Matrix::column(&[1.0]));
        assert_relative_eq!(l, -(0.99f64).ln(), epsilon = 1e-12);
        let wrong = BceLoss::loss(&Matrix::column(&[0.01]), &Matrix::column(&[1.0]));
        assert!(wrong > l);
    }

    #[test]
    fn negative_label_uses_complement() {
        let l = BceLoss::loss(&Matrix::column(&[0.25]), &Matrix::column(&[0.0]));
        assert_relative_eq!(l, -(0.75f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn derivative_is_difference() {
        let d = BceLoss::derivative(&Matrix::column(&[0.25]), &Matrix::column(&[1.0]));
        assert_eq!(d.data, vec![-0.75]);
    }
}
