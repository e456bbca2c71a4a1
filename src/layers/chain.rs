//! Forward and backward recursion over an index-addressed layer chain.
//!
//! Neighbours are reached through `index - 1` / `index + 1` into the owning
//! slice, so layers never hold references to each other.

use crate::layers::dense::Layer;
use crate::math::{matrix::Matrix, stack::Stack};

/// Passes `x` through `layers[index..]` and returns the output layer's
/// activation.
///
/// When `activations` is given, every layer (input included) pushes its
/// output before handing it on, leaving the stack ordered input → output.
pub fn feedforward(
    layers: &[Layer],
    index: usize,
    x: Matrix,
    mut activations: Option<&mut Stack>,
) -> Matrix {
    let out = match &layers[index] {
        Layer::Input { .. } => x,
        Layer::Hidden(dense) | Layer::Output(dense) => dense.forward(&x),
    };

    if let Some(stack) = activations.as_deref_mut() {
        stack.push(out.clone());
    }

    if index + 1 < layers.len() && !layers[index].is_output() {
        return feedforward(layers, index + 1, out, activations);
    }

    out
}

/// Walks from `layers[index]` back to the input layer, pushing one weight and
/// one bias gradient per non-input layer.
///
/// `delta` is the error in `layers[index + 1]`'s pre-activation space, or the
/// loss derivative when `index` is the output layer. Gradients are pushed
/// output-first, so popping `grad_ws` yields layer 1 first.
///
/// # Panics
/// Underflows `activations` unless it was filled by a recording forward pass
/// over the same chain.
pub fn backpropagation(
    layers: &[Layer],
    index: usize,
    delta: Matrix,
    activations: &mut Stack,
    grad_ws: &mut Stack,
    grad_bs: &mut Stack,
) {
    let dense = match &layers[index] {
        Layer::Input { .. } => return,
        Layer::Hidden(dense) | Layer::Output(dense) => dense,
    };

    // Hidden layers receive the successor's error and relay it through the
    // successor's weights.
    let delta = match layers.get(index + 1).and_then(Layer::weights) {
        Some(next_weights) if !layers[index].is_output() => next_weights.transpose().dot(&delta),
        _ => delta,
    };

    let own = activations.pop();
    let (delta, weights_grad, biases_grad) = dense.compute_gradients(&delta, &own, activations.peek());

    grad_ws.push(weights_grad);
    grad_bs.push(biases_grad);

    if index > 0 {
        backpropagation(layers, index - 1, delta, activations, grad_ws, grad_bs);
    }
}
