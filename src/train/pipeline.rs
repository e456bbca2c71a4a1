use crate::layers::chain;
use crate::layers::dense::Layer;
use crate::loss::loss_type::LossType;
use crate::math::{matrix::Matrix, stack::Stack};
use crate::train::pool::fan_out;

/// Gradients of one sample, as left on the stacks by backpropagation
/// (popping yields layer 1 first).
#[derive(Debug)]
pub struct SampleGradients {
    pub weights: Stack,
    pub biases: Stack,
    pub loss: f64,
}

/// Per-layer gradient sums over a minibatch.
///
/// Index `i` holds the gradient of `layers[i + 1]`; the input layer has no
/// parameters.
#[derive(Debug, Clone)]
pub struct BatchGradients {
    pub weights: Vec<Matrix>,
    pub biases: Vec<Matrix>,
    /// Sum of the per-sample losses.
    pub loss: f64,
    pub samples: usize,
}

impl BatchGradients {
    pub fn zeros(layers: &[Layer]) -> BatchGradients {
        let (weights, biases): (Vec<Matrix>, Vec<Matrix>) = layers.iter()
            .filter_map(Layer::dense)
            .map(|d| (
                Matrix::zeros(d.weights.rows, d.weights.cols),
                Matrix::zeros(d.biases.rows, d.biases.cols),
            ))
            .unzip();
        BatchGradients { weights, biases, loss: 0.0, samples: 0 }
    }

    /// Adds one sample's gradients, draining its stacks.
    pub fn accumulate(&mut self, mut sample: SampleGradients) {
        for (w_acc, b_acc) in self.weights.iter_mut().zip(self.biases.iter_mut()) {
            w_acc.add_assign(&sample.weights.pop());
            b_acc.add_assign(&sample.biases.pop());
        }
        self.loss += sample.loss;
        self.samples += 1;
    }
}

/// One recording forward pass followed by one backward pass.
pub fn sample_gradients(layers: &[Layer], loss: LossType, x: &Matrix, y: &Matrix) -> SampleGradients {
    let mut activations = Stack::new(layers.len());
    let mut weights = Stack::new(layers.len() - 1);
    let mut biases = Stack::new(layers.len() - 1);

    chain::feedforward(layers, 0, x.clone(), Some(&mut activations));
    let prediction = activations.peek();
    let sample_loss = loss.loss(prediction, y);
    let delta = loss.derivative(prediction, y);

    chain::backpropagation(layers, layers.len() - 1, delta, &mut activations, &mut weights, &mut biases);

    SampleGradients { weights, biases, loss: sample_loss }
}

/// Sums per-sample gradients for the samples `xs[i], ys[i]`, `i` in `batch`.
///
/// Samples are spread over a worker pool and reduced on a single thread, so
/// the result only depends on the batch up to floating-point summation order.
pub fn batch_gradients(
    layers: &[Layer],
    loss: LossType,
    xs: &[Matrix],
    ys: &[Matrix],
    batch: &[usize],
) -> BatchGradients {
    fan_out(
        batch.iter().map(|&i| (&xs[i], &ys[i])),
        BatchGradients::zeros(layers),
        |(x, y)| sample_gradients(layers, loss, x, y),
        BatchGradients::accumulate,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;
    use crate::layers::dense::Dense;
    use approx::assert_relative_eq;

    fn layers() -> Vec<Layer> {
        vec![
            Layer::Input { size: 2 },
            Layer::Hidden(Dense::new(
                Matrix::from_vec(3, 2, vec![0.5, -0.3, 0.8, 0.1, -0.6, 0.4]),
                Matrix::column(&[0.1, -0.1, 0.0]),
                Activation::Sigmoid,
            )),
            Layer::Output(Dense::new(
                Matrix::from_vec(2, 3, vec![0.2, 0.7, -0.5, -0.4, 0.3, 0.9]),
                Matrix::column(&[0.05, -0.05]),
                Activation::Softmax,
            )),
        ]
    }

    fn data() -> (Vec<Matrix>, Vec<Matrix>) {
        let xs = (0..16)
            .map(|i| Matrix::column(&[i as f64 / 8.0 - 1.0, ((i * 7) % 5) as f64 / 5.0]))
            .collect();
        let ys = (0..16)
            .map(|i| if i % 3 == 0 { Matrix::column(&[1.0, 0.0]) } else { Matrix::column(&[0.0, 1.0]) })
            .collect();
        (xs, ys)
    }

    #[test]
    fn gradient_shapes_match_parameters() {
        let layers = layers();
        let mut g = sample_gradients(&layers, LossType::CrossEntropy, &Matrix::column(&[1.0, -1.0]), &Matrix::column(&[0.0, 1.0]));
        for layer in &layers[1..] {
            let dense = layer.dense().unwrap();
            assert_eq!(g.weights.pop().shape(), dense.weights.shape());
            assert_eq!(g.biases.pop().shape(), dense.biases.shape());
        }
        assert!(g.weights.is_empty());
    }

    #[test]
    fn batch_sum_equals_sequential_sum() {
        let layers = layers();
        let (xs, ys) = data();
        let batch: Vec<usize> = (0..xs.len()).collect();

        let mut expected = BatchGradients::zeros(&layers);
        for &i in &batch {
            expected.accumulate(sample_gradients(&layers, LossType::CrossEntropy, &xs[i], &ys[i]));
        }

        let parallel = batch_gradients(&layers, LossType::CrossEntropy, &xs, &ys, &batch);
        assert_eq!(parallel.samples, batch.len());
        assert_relative_eq!(parallel.loss, expected.loss, max_relative = 1e-9);
        for l in 0..2 {
            for (a, b) in parallel.weights[l].data.iter().zip(&expected.weights[l].data) {
                assert_relative_eq!(a, b, epsilon = 1e-12, max_relative = 1e-9);
            }
            for (a, b) in parallel.biases[l].data.iter().zip(&expected.biases[l].data) {
                assert_relative_eq!(a, b, epsilon = 1e-12, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn order_of_samples_does_not_change_sum() {
        let layers = layers();
        let (xs, ys) = data();
        let forward: Vec<usize> = (0..xs.len()).collect();
        let reversed: Vec<usize> = forward.iter().rev().copied().collect();

        let a = batch_gradients(&layers, LossType::CrossEntropy, &xs, &ys, &forward);
        let b = batch_gradients(&layers, LossType::CrossEntropy, &xs, &ys, &reversed);
        for l in 0..2 {
            for (x, y) in a.weights[l].data.iter().zip(&b.weights[l].data) {
                assert_relative_eq!(x, y, epsilon = 1e-12, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn output_bias_gradient_folds_activation_derivative() {
        let layers = vec![
            Layer::Input { size: 1 },
            Layer::Output(Dense::new(Matrix::from_vec(1, 1, vec![0.4]), Matrix::column(&[0.2]), Activation::Sigmoid)),
        ];
        let x = Matrix::column(&[0.5]);
        let y = Matrix::column(&[1.0]);
        let mut g = sample_gradients(&layers, LossType::BinaryCrossEntropy, &x, &y);
        let gb = g.biases.pop().data[0];

        let z: f64 = 0.4 * 0.5 + 0.2;
        let a = 1.0 / (1.0 + (-z).exp());
        assert_relative_eq!(gb, (a - 1.0) * a * (1.0 - a), epsilon = 1e-12);
    }
}
