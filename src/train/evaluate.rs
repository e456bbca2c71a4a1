use crate::layers::chain;
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::train::evaluation::Evaluation;
use crate::train::pool::fan_out;

/// Runs inference over `xs` on the worker pool and tallies the predictions
/// against `ys`.
///
/// The class count is the output layer width. `xs` and `ys` must have equal
/// length.
pub fn evaluate(layers: &[Layer], xs: &[Matrix], ys: &[Matrix]) -> Evaluation {
    let classes = layers.last().map(Layer::size).unwrap_or(0);

    let mut evaluation = fan_out(
        xs.iter().zip(ys.iter()),
        Evaluation::new(classes),
        |(x, y)| (chain::feedforward(layers, 0, x.clone(), None), y),
        |ev, (prediction, truth)| ev.record(&prediction, truth),
    );
    evaluation.finish();
    evaluation
}
