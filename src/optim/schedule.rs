use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

/// Learning rate as a pure function of `(epochs, epoch)`, with `epoch` 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    /// Constant rate.
    Flat { rate: f64 },
    /// Cosine decay from `initial` to `final_rate` without warm restarts
    /// (Loshchilov & Hutter, SGDR).
    CosineDecay { initial: f64, final_rate: f64 },
}

impl Schedule {
    pub fn flat(rate: f64) -> Schedule {
        Schedule::Flat { rate }
    }

    pub fn cosine_decay(initial: f64, final_rate: f64) -> Schedule {
        Schedule::CosineDecay { initial, final_rate }
    }

    pub fn rate(&self, epochs: usize, epoch: usize) -> f64 {
        match *self {
            Schedule::Flat { rate } => rate,
            Schedule::CosineDecay { initial, final_rate } => {
                if epoch == 1 {
                    return initial;
                }
                final_rate
                    + 0.5 * (initial - final_rate) * (1.0 + (PI * epoch as f64 / epochs as f64).cos())
            }
        }
    }
}
