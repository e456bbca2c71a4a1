use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

use crate::math::matrix::Matrix;

/// Produces the initial values of a freshly attached layer's parameters.
///
/// Called once for the weights `(rows, cols)` and once for the biases
/// `(rows, 1)` of every non-input layer.
pub trait WeightInitializer: Send {
    fn init_weights(&mut self, rows: usize, cols: usize) -> Matrix;
}

/// Standard deviation policy for [`NormalInitializer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// N(0, 1).
    Standard,
    /// N(0, sqrt(2 / cols)); suited to ReLU layers.
    He,
    /// N(0, sqrt(1 / cols)); suited to Sigmoid/Tanh layers.
    Xavier,
}

/// Draws every entry independently from a normal distribution.
pub struct NormalInitializer {
    scale: Scale,
    rng: StdRng,
}

impl NormalInitializer {
    pub fn new(scale: Scale) -> NormalInitializer {
        NormalInitializer {
            scale,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible initializer; the same seed yields the same matrices.
    pub fn seeded(scale: Scale, seed: u64) -> NormalInitializer {
        NormalInitializer {
            scale,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn std_dev(&self, cols: usize) -> f64 {
        match self.scale {
            Scale::Standard => 1.0,
            Scale::He => (2.0 / cols as f64).sqrt(),
            Scale::Xavier => (1.0 / cols as f64).sqrt(),
        }
    }
}

impl Default for NormalInitializer {
    fn default() -> Self {
        NormalInitializer::new(Scale::Standard)
    }
}

impl WeightInitializer for NormalInitializer {
    fn init_weights(&mut self, rows: usize, cols: usize) -> Matrix {
        let std_dev = self.std_dev(cols);
        let data = (0..rows * cols)
            .map(|_| std_dev * self.rng.sample::<f64, _>(StandardNormal))
            .collect();
        Matrix::from_vec(rows, cols, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_requested_shape() {
        let mut init = NormalInitializer::default();
        let w = init.init_weights(4, 3);
        assert_eq!(w.shape(), (4, 3));
        let b = init.init_weights(4, 1);
        assert_eq!(b.shape(), (4, 1));
    }

    #[test]
    fn seeded_initializers_agree() {
        let a = NormalInitializer::seeded(Scale::Standard, 7).init_weights(5, 5);
        let b = NormalInitializer::seeded(Scale::Standard, 7).init_weights(5, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn seeded_draws_follow_rand_distr_standard_normal() {
        let w = NormalInitializer::seeded(Scale::Xavier, 11).init_weights(3, 4);
        let mut rng = StdRng::seed_from_u64(11);
        let std_dev = 0.5;
        for &value in &w.data {
            let expected: f64 = rng.sample(StandardNormal);
            assert_eq!(value, std_dev * expected);
        }
    }

    #[test]
    fn standard_normal_moments_are_plausible() {
        let mut init = NormalInitializer::seeded(Scale::Standard, 42);
        let m = init.init_weights(100, 100);
        let n = m.data.len() as f64;
        let mean = m.data.iter().sum::<f64>() / n;
        let var = m.data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.05, "mean = {mean}");
        assert!((var - 1.0).abs() < 0.1, "var = {var}");
    }

    #[test]
    fn he_shrinks_spread_with_fan_in() {
        let mut init = NormalInitializer::seeded(Scale::He, 3);
        let m = init.init_weights(50, 200);
        let n = m.data.len() as f64;
        let var = m.data.iter().map(|x| x * x).sum::<f64>() / n;
        assert!((var - 0.01).abs() < 0.003, "var = {var}");
    }
}
