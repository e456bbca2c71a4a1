use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `FitOptions`, the training
/// loop sends one `EpochStats` value at the end of every completed epoch,
/// before callbacks run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Learning rate the schedule produced for this epoch.
    pub learning_rate: f64,
    /// Training loss over this epoch, reduced per the network's `Reduction`.
    pub train_loss: f64,
    /// Validation accuracy as a fraction in [0, 1].
    pub val_accuracy: f64,
    /// Wall-clock duration of the training pass in milliseconds.
    pub elapsed_ms: u64,
}
