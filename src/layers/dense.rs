use crate::{activation::activation::Activation, math::matrix::Matrix};

/// Trainable part of a hidden or output layer.
#[derive(Debug, Clone)]
pub struct Dense {
    /// Shape `(neurons, inputs)`.
    pub weights: Matrix,
    /// Shape `(neurons, 1)`.
    pub biases: Matrix,
    pub activation: Activation,
}

impl Dense {
    pub fn new(weights: Matrix, biases: Matrix, activation: Activation) -> Dense {
        Dense { weights, biases, activation }
    }

    /// `activation(W · x + b)`.
    pub fn forward(&self, x: &Matrix) -> Matrix {
        let mut y = self.weights.dot(x);
        y.add_assign(&self.biases);
        self.activation.activate(&y)
    }

    /// Gradients for this layer given the error `delta` in its activation
    /// space, its own activation and the previous layer's activation.
    ///
    /// Returns `(δ, ∇W, ∇b)` where `δ = delta ⊙ f'(activation)`, `∇b = δ`
    /// and `∇W = δ · previousᵗ`.
    pub fn compute_gradients(
        &self,
        delta: &Matrix,
        activation: &Matrix,
        previous: &Matrix,
    ) -> (Matrix, Matrix, Matrix) {
        let layer_delta = delta.hadamard(&self.activation.derivative(activation));
        let weights_grad = layer_delta.dot(&previous.transpose());
        let biases_grad = layer_delta.clone();
        (layer_delta, weights_grad, biases_grad)
    }

    pub fn neurons(&self) -> usize {
        self.weights.rows
    }

    pub fn inputs(&self) -> usize {
        self.weights.cols
    }
}

/// One node of the layer chain.
#[derive(Debug, Clone)]
pub enum Layer {
    /// Passes its input through unchanged; owns no parameters.
    Input { size: usize },
    Hidden(Dense),
    /// Terminal layer; its activation output is the network's prediction.
    Output(Dense),
}

impl Layer {
    /// Neuron count, i.e. the row count of this layer's output vector.
    pub fn size(&self) -> usize {
        match self {
            Layer::Input { size } => *size,
            Layer::Hidden(dense) | Layer::Output(dense) => dense.neurons(),
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, Layer::Input { .. })
    }

    pub fn is_output(&self) -> bool {
        matches!(self, Layer::Output(_))
    }

    pub fn dense(&self) -> Option<&Dense> {
        match self {
            Layer::Input { .. } => None,
            Layer::Hidden(dense) | Layer::Output(dense) => Some(dense),
        }
    }

    pub fn dense_mut(&mut self) -> Option<&mut Dense> {
        match self {
            Layer::Input { .. } => None,
            Layer::Hidden(dense) | Layer::Output(dense) => Some(dense),
        }
    }

    pub fn weights(&self) -> Option<&Matrix> {
        self.dense().map(|d| &d.weights)
    }

    pub fn biases(&self) -> Option<&Matrix> {
        self.dense().map(|d| &d.biases)
    }

    pub fn activation(&self) -> Option<Activation> {
        self.dense().map(|d| d.activation)
    }
}
