pub mod callbacks;
pub mod epoch_stats;
pub mod evaluate;
pub mod evaluation;
pub mod fit_options;
pub mod loop_fn;
pub mod pipeline;
pub mod pool;

pub use callbacks::{Callback, Control, EarlyStopping, SaveBest};
pub use epoch_stats::EpochStats;
pub use evaluate::evaluate;
pub use evaluation::{argmax, Counter, Evaluation};
pub use fit_options::FitOptions;
pub use loop_fn::train_loop;
pub use pipeline::{batch_gradients, BatchGradients, SampleGradients};
