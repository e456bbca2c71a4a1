use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::optim::schedule::Schedule;
use crate::train::epoch_stats::EpochStats;

/// Configuration for one `train_loop` run.
///
/// # Fields
/// - `train_x`, `train_y` — training inputs and one-hot labels, as column vectors
/// - `val_x`, `val_y`     — validation set evaluated after every epoch
/// - `epochs`             — total number of full passes over the training data
/// - `batch_size`         — samples per minibatch; the last one may be smaller
/// - `learning_rate`      — schedule queried once per epoch
/// - `progress_tx`        — optional channel sender; one `EpochStats` is sent per
///                          completed epoch.  If the receiver is dropped the loop
///                          terminates early.
/// - `stop_flag`          — optional atomic flag; when set to `true` from another
///                          thread the loop terminates at the next epoch boundary.
pub struct FitOptions<'a> {
    pub train_x: &'a [Matrix],
    pub train_y: &'a [Matrix],
    pub val_x: &'a [Matrix],
    pub val_y: &'a [Matrix],
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: Schedule,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl<'a> FitOptions<'a> {
    /// Creates `FitOptions` with no progress channel and no stop flag.
    pub fn new(
        train: (&'a [Matrix], &'a [Matrix]),
        validation: (&'a [Matrix], &'a [Matrix]),
        epochs: usize,
        batch_size: usize,
        learning_rate: Schedule,
    ) -> Self {
        FitOptions {
            train_x: train.0,
            train_y: train.1,
            val_x: validation.0,
            val_y: validation.1,
            epochs,
            batch_size,
            learning_rate,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    /// Checks counts, lengths and sample shapes against a network with the
    /// given input and output widths.
    pub fn validate(&self, input_size: usize, output_size: usize) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be greater than zero".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch size must be greater than zero".into()));
        }

        for (name, xs, ys) in [("training", self.train_x, self.train_y), ("validation", self.val_x, self.val_y)] {
            if xs.is_empty() || ys.is_empty() {
                return Err(Error::InvalidData(format!("{name} set must not be empty")));
            }
            check_set(name, xs, ys, input_size, output_size)?;
        }

        Ok(())
    }
}

/// Checks that `xs` and `ys` pair up and that every sample is an
/// `input_size × 1` column and every label an `output_size × 1` column.
pub fn check_set(name: &str, xs: &[Matrix], ys: &[Matrix], input_size: usize, output_size: usize) -> Result<()> {
    if xs.len() != ys.len() {
        return Err(Error::InvalidData(format!(
            "{name} set has {} inputs but {} labels",
            xs.len(),
            ys.len()
        )));
    }
    if let Some(i) = xs.iter().position(|x| x.shape() != (input_size, 1)) {
        return Err(Error::InvalidShape(format!(
            "{name} input {i} is {}x{}, expected {input_size}x1",
            xs[i].rows, xs[i].cols
        )));
    }
    if let Some(i) = ys.iter().position(|y| y.shape() != (output_size, 1)) {
        return Err(Error::InvalidShape(format!(
            "{name} label {i} is {}x{}, expected {output_size}x1",
            ys[i].rows, ys[i].cols
        )));
    }
    Ok(())
}
