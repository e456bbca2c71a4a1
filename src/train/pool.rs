//! Per-call fan-out/fan-in worker pool.
//!
//! The calling thread feeds a bounded task queue, a fixed set of workers turns
//! tasks into results, and one reducer folds every result into an
//! accumulator it owns. The accumulator is only ever touched by the reducer,
//! then handed back by value once both queues are drained.

use std::num::NonZeroUsize;
use std::panic;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;

use tracing::debug;

/// Number of logical CPUs, falling back to one.
pub fn worker_count() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Runs `work` over `tasks` on [`worker_count`] threads and folds the
/// results into `acc` on a single reducer thread.
///
/// Results arrive in no particular order. A panic in a worker or the reducer
/// is re-raised on the caller.
pub fn fan_out<T, R, A, W, F>(tasks: impl IntoIterator<Item = T>, acc: A, work: W, mut fold: F) -> A
where
    T: Send,
    R: Send,
    A: Send,
    W: Fn(T) -> R + Sync,
    F: FnMut(&mut A, R) + Send,
{
    let workers = worker_count();
    debug!(workers, "starting worker pool");

    let (task_tx, task_rx) = mpsc::sync_channel::<T>(workers);
    let (result_tx, result_rx) = mpsc::sync_channel::<R>(workers);
    let task_rx = Arc::new(Mutex::new(task_rx));

    thread::scope(|s| {
        let reducer = s.spawn(move || {
            let mut acc = acc;
            for result in result_rx {
                fold(&mut acc, result);
            }
            acc
        });

        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let result_tx = result_tx.clone();
                let task_rx = Arc::clone(&task_rx);
                let work = &work;
                s.spawn(move || loop {
                    let task = task_rx
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .recv();
                    let Ok(task) = task else { break };
                    if result_tx.send(work(task)).is_err() {
                        break;
                    }
                })
            })
            .collect();
        // Workers hold the only remaining handles: the result queue closes
        // when the last of them exits, and so does the task queue if they all
        // die early.
        drop(result_tx);
        drop(task_rx);

        for task in tasks {
            if task_tx.send(task).is_err() {
                break;
            }
        }
        drop(task_tx);

        for handle in handles {
            if let Err(payload) = handle.join() {
                panic::resume_unwind(payload);
            }
        }

        match reducer.join() {
            Ok(acc) => acc,
            Err(payload) => panic::resume_unwind(payload),
        }
    })
}
