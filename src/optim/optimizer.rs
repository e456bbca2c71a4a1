use crate::math::matrix::Matrix;

/// Applies one parameter update in place.
///
/// `velocity` is the caller-owned state slot for this exact parameter
/// matrix. Stateless optimizers leave it untouched; stateful ones fill it
/// lazily on first use.
pub trait Optimizer: Send {
    fn apply(&self, parameter: &mut Matrix, gradient: &Matrix, velocity: &mut Option<Matrix>, rate: f64);
}

/// Optimizer memory for one layer's weights and biases.
#[derive(Debug, Clone, Default)]
pub struct LayerState {
    pub weights: Option<Matrix>,
    pub biases: Option<Matrix>,
}

/// Per-layer optimizer state, indexed like the network's layer vector.
#[derive(Debug, Clone, Default)]
pub struct OptimizerState {
    slots: Vec<LayerState>,
}

impl OptimizerState {
    /// Returns the slot for `layer`, growing the table if needed.
    pub fn slot_mut(&mut self, layer: usize) -> &mut LayerState {
        if self.slots.len() <= layer {
            self.slots.resize_with(layer + 1, LayerState::default);
        }
        &mut self.slots[layer]
    }

    pub fn slot(&self, layer: usize) -> Option<&LayerState> {
        self.slots.get(layer)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
