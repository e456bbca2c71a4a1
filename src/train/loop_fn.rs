use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::seq::SliceRandom;
use tracing::info;

use crate::error::Result;
use crate::loss::loss_type::LossTracker;
use crate::network::network::Network;
use crate::train::callbacks::Control;
use crate::train::epoch_stats::EpochStats;
use crate::train::evaluate::evaluate;
use crate::train::evaluation::Evaluation;
use crate::train::fit_options::FitOptions;
use crate::train::pipeline::batch_gradients;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for up to `options.epochs` epochs and returns the
/// validation result of the last completed epoch.
///
/// Each epoch shuffles the training order, derives the learning rate from the
/// schedule, runs one gradient pipeline per minibatch, evaluates the
/// validation set and then runs the network's callbacks.
///
/// # Early termination
/// The loop ends before `options.epochs` if:
/// - a callback returns [`Control::Stop`],
/// - the `progress_tx` receiver has been dropped, **or**
/// - `options.stop_flag` is set to `true`.
///
/// # Errors
/// Invalid options or an incomplete network are reported before any weight
/// changes. Callback errors end training and are passed through.
pub fn train_loop(network: &mut Network, options: &FitOptions) -> Result<Evaluation> {
    network.check_complete()?;
    options.validate(network.input_size(), network.output_size())?;

    let n = options.train_x.len();
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = rand::thread_rng();
    let mut tracker = LossTracker::new(network.reduction());
    let mut evaluation = Evaluation::new(network.output_size());

    for epoch in 1..=options.epochs {
        if stop_requested(options) {
            break;
        }

        let t_start = Instant::now();

        // X and Y stay paired: only the index order is shuffled.
        indices.shuffle(&mut rng);
        let lr = options.learning_rate.rate(options.epochs, epoch);

        // ── One full pass over the training data ───────────────────────────
        tracker.reset();
        for batch in indices.chunks(options.batch_size) {
            let gradients = batch_gradients(
                network.layers(),
                network.loss(),
                options.train_x,
                options.train_y,
                batch,
            );
            tracker.add(gradients.loss);
            // Gradients are sums; dividing the rate turns them into means.
            network.apply_gradients(&gradients, lr / batch.len() as f64);
        }
        let elapsed = t_start.elapsed();
        let train_loss = tracker.result(n);

        // ── Validation ────────────────────────────────────────────────────
        evaluation = evaluate(network.layers(), options.val_x, options.val_y);

        info!(
            epoch,
            elapsed_secs = elapsed.as_secs_f64(),
            val_acc = evaluation.accuracy,
            lr,
            train_loss,
            "epoch complete"
        );

        // ── Emit progress ─────────────────────────────────────────────────
        if let Some(ref tx) = options.progress_tx {
            let stats = EpochStats {
                epoch,
                total_epochs: options.epochs,
                learning_rate: lr,
                train_loss,
                val_accuracy: evaluation.accuracy,
                elapsed_ms: elapsed.as_millis() as u64,
            };
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                info!(epoch, "progress receiver dropped, stopping");
                break;
            }
        }

        // ── Callbacks ─────────────────────────────────────────────────────
        if network.run_callbacks(epoch, &evaluation)? == Control::Stop {
            info!(epoch, "stopped by callback");
            break;
        }
    }

    Ok(evaluation)
}

fn stop_requested(options: &FitOptions) -> bool {
    options
        .stop_flag
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}
