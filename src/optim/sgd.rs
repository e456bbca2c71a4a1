use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::optim::optimizer::Optimizer;

/// Stochastic gradient descent with optional momentum and Nesterov look-ahead.
///
/// With `momentum == 0` the update is `p -= rate · g`. Otherwise a velocity
/// is kept per parameter slot:
///
/// ```text
/// v = momentum · v + (1 - momentum) · g
/// applied = g + momentum · v    (nesterov)
/// applied = v                   (classic)
/// p -= rate · applied
/// ```
///
/// The velocity slot is seeded with a copy of the parameter values the first
/// time it is seen, not with zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct Sgd {
    momentum: f64,
    nesterov: bool,
}

impl Sgd {
    /// Plain SGD, no velocity state.
    pub fn new() -> Sgd {
        Sgd { momentum: 0.0, nesterov: false }
    }

    /// Momentum SGD; `momentum` must lie in `[0, 1)`.
    pub fn with_momentum(momentum: f64, nesterov: bool) -> Result<Sgd> {
        if !(0.0..1.0).contains(&momentum) {
            return Err(Error::InvalidConfig(format!(
                "momentum must be in [0, 1), got {momentum}"
            )));
        }
        Ok(Sgd { momentum, nesterov })
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    pub fn nesterov(&self) -> bool {
        self.nesterov
    }
}

impl Default for Sgd {
    fn default() -> Self {
        Sgd::new()
    }
}

impl Optimizer for Sgd {
    fn apply(&self, parameter: &mut Matrix, gradient: &Matrix, velocity: &mut Option<Matrix>, rate: f64) {
        if self.momentum == 0.0 {
            parameter.sub_scaled(gradient, rate);
            return;
        }

        let v = velocity.get_or_insert_with(|| parameter.clone());
        for (v, g) in v.data.iter_mut().zip(&gradient.data) {
            *v = self.momentum * *v + (1.0 - self.momentum) * g;
        }

        if self.nesterov {
            let mut applied = gradient.clone();
            for (a, v) in applied.data.iter_mut().zip(&v.data) {
                *a += self.momentum * v;
            }
            parameter.sub_scaled(&applied, rate);
        } else {
            parameter.sub_scaled(v, rate);
        }
    }
}
