use crate::error::{Error, Result};
use crate::layers::chain;
use crate::layers::dense::{Dense, Layer};
use crate::layers::init::{NormalInitializer, WeightInitializer};
use crate::loss::loss_type::{LossType, Reduction};
use crate::math::matrix::Matrix;
use crate::network::spec::LayerSpec;
use crate::optim::optimizer::{Optimizer, OptimizerState};
use crate::optim::sgd::Sgd;
use crate::train::callbacks::{Callback, Control};
use crate::train::evaluate::evaluate;
use crate::train::evaluation::Evaluation;
use crate::train::fit_options::{check_set, FitOptions};
use crate::train::loop_fn::train_loop;
use crate::train::pipeline::BatchGradients;

/// A feed-forward chain of layers plus everything needed to train it.
///
/// Layers are owned in order (input first, output last) and addressed by
/// index. Optimizer memory lives in per-layer slots next to them.
pub struct Network {
    layers: Vec<Layer>,
    optimizer: Box<dyn Optimizer>,
    state: OptimizerState,
    loss: LossType,
    reduction: Reduction,
    initializer: Box<dyn WeightInitializer>,
    callbacks: Vec<Box<dyn Callback>>,
}

impl Network {
    /// Empty network with plain SGD, mean-reduced cross-entropy and N(0, 1)
    /// initialization.
    pub fn new() -> Network {
        Network {
            layers: Vec::new(),
            optimizer: Box::new(Sgd::new()),
            state: OptimizerState::default(),
            loss: LossType::CrossEntropy,
            reduction: Reduction::Mean,
            initializer: Box::new(NormalInitializer::default()),
            callbacks: Vec::new(),
        }
    }

    /// Replaces the optimizer and drops any velocity collected so far.
    pub fn set_optimizer<O: Optimizer + 'static>(&mut self, optimizer: O) {
        self.optimizer = Box::new(optimizer);
        self.state.clear();
    }

    pub fn set_loss(&mut self, loss: LossType, reduction: Reduction) {
        self.loss = loss;
        self.reduction = reduction;
    }

    /// Initializer used by subsequent `add_layer` calls.
    pub fn set_initializer<I: WeightInitializer + 'static>(&mut self, initializer: I) {
        self.initializer = Box::new(initializer);
    }

    pub fn add_callback<C: Callback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Appends a layer, drawing fresh weights `(size, previous size)` and
    /// biases `(size, 1)` from the initializer.
    pub fn add_layer(&mut self, spec: LayerSpec) -> Result<()> {
        let layer = match spec {
            LayerSpec::Input { size } => Layer::Input { size },
            LayerSpec::Hidden { size, activation } | LayerSpec::Output { size, activation } => {
                let cols = self.layers.last().map(Layer::size).unwrap_or(0);
                let weights = self.initializer.init_weights(size, cols);
                let biases = self.initializer.init_weights(size, 1);
                let dense = Dense::new(weights, biases, activation);
                if matches!(spec, LayerSpec::Output { .. }) {
                    Layer::Output(dense)
                } else {
                    Layer::Hidden(dense)
                }
            }
        };
        self.attach(layer)
    }

    /// Appends a layer with its parameters as given, e.g. from a saved model.
    pub fn attach(&mut self, layer: Layer) -> Result<()> {
        if layer.size() == 0 {
            return Err(Error::InvalidShape("layer size must be greater than zero".into()));
        }

        match self.layers.last() {
            None if !layer.is_input() => {
                return Err(Error::InvalidConfig("the first layer must be an input layer".into()));
            }
            Some(_) if layer.is_input() => {
                return Err(Error::InvalidConfig("only the first layer may be an input layer".into()));
            }
            Some(last) if last.is_output() => {
                return Err(Error::InvalidConfig("no layer may follow the output layer".into()));
            }
            _ => {}
        }

        if let (Some(prev), Some(dense)) = (self.layers.last(), layer.dense()) {
            if dense.weights.shape() != (dense.neurons(), prev.size()) {
                return Err(Error::InvalidShape(format!(
                    "weights are {}x{}, expected {}x{}",
                    dense.weights.rows, dense.weights.cols, dense.neurons(), prev.size()
                )));
            }
            if dense.biases.shape() != (dense.neurons(), 1) {
                return Err(Error::InvalidShape(format!(
                    "biases are {}x{}, expected {}x1",
                    dense.biases.rows, dense.biases.cols, dense.neurons()
                )));
            }
        }

        self.layers.push(layer);
        Ok(())
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Neuron count of every layer, input first.
    pub fn sizes(&self) -> Vec<usize> {
        self.layers.iter().map(Layer::size).collect()
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(Layer::size).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(Layer::size).unwrap_or(0)
    }

    pub fn loss(&self) -> LossType {
        self.loss
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    pub fn optimizer_state(&self) -> &OptimizerState {
        &self.state
    }

    /// Fails unless the chain runs from an input layer to an output layer.
    pub fn check_complete(&self) -> Result<()> {
        match (self.layers.first(), self.layers.last()) {
            (Some(first), Some(last)) if first.is_input() && last.is_output() && self.layers.len() >= 2 => Ok(()),
            _ => Err(Error::InvalidConfig(
                "network needs an input layer followed by at least an output layer".into(),
            )),
        }
    }

    /// Forward pass without recording activations.
    ///
    /// # Panics
    /// Panics on an empty network or if `x` is not `input_size × 1`.
    pub fn predict(&self, x: &Matrix) -> Matrix {
        assert!(!self.layers.is_empty(), "cannot run an empty network");
        chain::feedforward(&self.layers, 0, x.clone(), None)
    }

    /// Runs every registered callback in order; the first `Stop` (or error)
    /// short-circuits the rest.
    pub(crate) fn run_callbacks(&mut self, epoch: usize, evaluation: &Evaluation) -> Result<Control> {
        let mut callbacks = std::mem::take(&mut self.callbacks);
        let mut outcome = Ok(Control::Continue);
        for callback in callbacks.iter_mut() {
            match callback.after_epoch(self, epoch, evaluation) {
                Ok(Control::Continue) => {}
                other => {
                    outcome = other;
                    break;
                }
            }
        }
        self.callbacks = callbacks;
        outcome
    }

    /// Applies summed batch gradients to every non-input layer.
    ///
    /// `rate` should already be divided by the batch length.
    pub fn apply_gradients(&mut self, gradients: &BatchGradients, rate: f64) {
        for (i, layer) in self.layers.iter_mut().enumerate().skip(1) {
            if let Some(dense) = layer.dense_mut() {
                let slot = self.state.slot_mut(i);
                self.optimizer.apply(&mut dense.weights, &gradients.weights[i - 1], &mut slot.weights, rate);
                self.optimizer.apply(&mut dense.biases, &gradients.biases[i - 1], &mut slot.biases, rate);
            }
        }
    }

    /// Trains the network; see [`train_loop`].
    pub fn fit(&mut self, options: &FitOptions) -> Result<Evaluation> {
        train_loop(self, options)
    }

    /// Accuracy, confusion matrix and per-class precision/recall over a
    /// labelled set.
    pub fn evaluate(&self, xs: &[Matrix], ys: &[Matrix]) -> Result<Evaluation> {
        self.check_complete()?;
        check_set("evaluation", xs, ys, self.input_size(), self.output_size())?;
        Ok(evaluate(&self.layers, xs, ys))
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;
    use crate::layers::init::Scale;

    fn network(sizes: &[usize]) -> Network {
        let mut n = Network::new();
        n.set_initializer(NormalInitializer::seeded(Scale::Standard, 1));
        n.add_layer(LayerSpec::Input { size: sizes[0] }).unwrap();
        for &s in &sizes[1..sizes.len() - 1] {
            n.add_layer(LayerSpec::Hidden { size: s, activation: Activation::Sigmoid }).unwrap();
        }
        n.add_layer(LayerSpec::Output { size: sizes[sizes.len() - 1], activation: Activation::Softmax }).unwrap();
        n
    }

    #[test]
    fn forward_output_has_last_layer_shape() {
        for sizes in [vec![2, 2], vec![4, 3, 2], vec![784, 30, 10], vec![1, 5, 5, 5, 3]] {
            let n = network(&sizes);
            let out = n.predict(&Matrix::zeros(sizes[0], 1));
            assert_eq!(out.shape(), (sizes[sizes.len() - 1], 1));
        }
    }

    #[test]
    fn add_layer_wires_shapes_from_predecessor() {
        let n = network(&[4, 3, 2]);
        assert_eq!(n.sizes(), vec![4, 3, 2]);
        assert_eq!(n.layers()[1].weights().map(Matrix::shape), Some((3, 4)));
        assert_eq!(n.layers()[2].weights().map(Matrix::shape), Some((2, 3)));
        assert_eq!(n.layers()[2].biases().map(Matrix::shape), Some((2, 1)));
        assert!(n.check_complete().is_ok());
    }

    #[test]
    fn layer_order_is_enforced() {
        let mut n = Network::new();
        let hidden = LayerSpec::Hidden { size: 2, activation: Activation::Sigmoid };
        assert!(matches!(n.add_layer(hidden.clone()), Err(Error::InvalidConfig(_))));
        n.add_layer(LayerSpec::Input { size: 2 }).unwrap();
        assert!(n.check_complete().is_err());
        assert!(matches!(n.add_layer(LayerSpec::Input { size: 2 }), Err(Error::InvalidConfig(_))));
        n.add_layer(LayerSpec::Output { size: 2, activation: Activation::Softmax }).unwrap();
        assert!(matches!(n.add_layer(hidden), Err(Error::InvalidConfig(_))));
        assert!(matches!(
            Network::new().add_layer(LayerSpec::Input { size: 0 }),
            Err(Error::InvalidShape(_))
        ));
    }

    #[test]
    fn evaluate_rejects_misshaped_samples_and_labels() {
        let n = network(&[2, 3, 2]);
        let xs = vec![Matrix::zeros(2, 1); 2];
        let wide_labels = vec![Matrix::column(&[1.0, 0.0]), Matrix::column(&[0.0, 0.0, 1.0])];
        assert!(matches!(n.evaluate(&xs, &wide_labels), Err(Error::InvalidShape(_))));

        let ys = vec![Matrix::column(&[1.0, 0.0]); 2];
        let narrow_inputs = vec![Matrix::zeros(2, 1), Matrix::zeros(1, 1)];
        assert!(matches!(n.evaluate(&narrow_inputs, &ys), Err(Error::InvalidShape(_))));
        assert!(matches!(n.evaluate(&xs, &ys[..1]), Err(Error::InvalidData(_))));

        let ev = n.evaluate(&xs, &ys).unwrap();
        assert_eq!(ev.total, 2);
    }

    #[test]
    fn attach_rejects_mismatched_weights() {
        let mut n = Network::new();
        n.attach(Layer::Input { size: 3 }).unwrap();
        let bad = Layer::Output(Dense::new(Matrix::zeros(2, 4), Matrix::zeros(2, 1), Activation::Softmax));
        assert!(matches!(n.attach(bad), Err(Error::InvalidShape(_))));
    }
}
